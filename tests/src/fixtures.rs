//! Shared test fixtures.

use bridge_types::{BinaryEnvelope, HostCompletion, HostMessage};
use bytes::Bytes;
use host_bridge::{
    BridgeConfig, HostBindings, HostBridge, HostChannel, HostInbound, HostSimulator,
    InMemoryKVStore, SimulatorConfig, TransportError, UploadConfig,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Config with millisecond delays and short acknowledgement timeouts.
pub fn fast_config(chunk_size: usize) -> BridgeConfig {
    BridgeConfig {
        upload: UploadConfig {
            chunk_size,
            chunk_ack_timeout: Duration::from_millis(150),
            file_ack_timeout: Duration::from_millis(150),
        },
        simulator: SimulatorConfig {
            response_delay: Duration::from_millis(2),
            ack_delay: Duration::from_millis(2),
            store_path: None,
        },
        ..BridgeConfig::default()
    }
}

/// Deterministic non-trivial payload.
pub fn payload(size: usize) -> Bytes {
    Bytes::from((0..size).map(|i| (i * 31 % 256) as u8).collect::<Vec<u8>>())
}

/// A frame as the scripted host saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text { method: String },
    Binary { file_id: String, chunk_index: Option<u32>, len: usize },
}

/// Simulated host behind a real binding, recording every frame.
///
/// `withhold_chunk` makes the host swallow one binary chunk without
/// acknowledging it. [`ScriptedHost::answer`], [`ScriptedHost::refuse`] and
/// [`ScriptedHost::swallow_file_frames`] script the other failure modes.
pub struct ScriptedHost {
    pub simulator: HostSimulator,
    pub frames: Mutex<Vec<Frame>>,
    inbound: HostInbound,
    response_delay: Duration,
    withhold_chunk: Option<u32>,
    answers: Mutex<HashMap<String, Value>>,
    refused: Mutex<HashSet<String>>,
    swallow_files: Mutex<bool>,
}

impl ScriptedHost {
    pub fn new(inbound: HostInbound, config: &BridgeConfig, withhold_chunk: Option<u32>) -> Self {
        Self {
            simulator: HostSimulator::new(
                inbound.clone(),
                config.simulator.clone(),
                Box::new(InMemoryKVStore::new()),
            ),
            frames: Mutex::new(Vec::new()),
            inbound,
            response_delay: config.simulator.response_delay,
            withhold_chunk,
            answers: Mutex::new(HashMap::new()),
            refused: Mutex::new(HashSet::new()),
            swallow_files: Mutex::new(false),
        }
    }

    /// Answer every `method` call with `result` instead of simulating it.
    pub fn answer(&self, method: &str, result: Value) {
        self.answers.lock().insert(method.to_string(), result);
    }

    /// Fail dispatch of every `method` call.
    pub fn refuse(&self, method: &str) {
        self.refused.lock().insert(method.to_string());
    }

    /// Accept whole-file binary frames without storing or acknowledging them.
    pub fn swallow_file_frames(&self) {
        *self.swallow_files.lock() = true;
    }

    /// Methods of the text frames, in order.
    pub fn methods(&self) -> Vec<String> {
        self.frames
            .lock()
            .iter()
            .filter_map(|f| match f {
                Frame::Text { method } => Some(method.clone()),
                Frame::Binary { .. } => None,
            })
            .collect()
    }

    /// Chunk indices of the binary frames, in order.
    pub fn binary_chunks(&self) -> Vec<u32> {
        self.frames
            .lock()
            .iter()
            .filter_map(|f| match f {
                Frame::Binary { chunk_index, .. } => *chunk_index,
                Frame::Text { .. } => None,
            })
            .collect()
    }
}

impl HostChannel for ScriptedHost {
    fn post_message(&self, message: &str) -> Result<(), TransportError> {
        let parsed =
            HostMessage::from_json(message).map_err(|e| TransportError::Rejected(e.to_string()))?;
        self.frames.lock().push(Frame::Text {
            method: parsed.method.clone(),
        });

        if self.refused.lock().contains(&parsed.method) {
            return Err(TransportError::Rejected(format!("{} refused", parsed.method)));
        }

        let scripted = self.answers.lock().get(&parsed.method).cloned();
        if let Some(result) = scripted {
            let inbound = self.inbound.clone();
            let delay = self.response_delay;
            let completion = HostCompletion::new(parsed.callback_id, result)
                .to_json()
                .map_err(|e| TransportError::Rejected(e.to_string()))?;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                inbound.receive_from_host("callback", &completion);
            });
            return Ok(());
        }

        self.simulator.post_message(message)
    }

    fn post_binary(&self, envelope: BinaryEnvelope) -> Result<(), TransportError> {
        self.frames.lock().push(Frame::Binary {
            file_id: envelope.file_id.clone(),
            chunk_index: envelope.chunk_index,
            len: envelope.body.len(),
        });
        if envelope.chunk_index.is_some() && envelope.chunk_index == self.withhold_chunk {
            return Ok(());
        }
        if envelope.chunk_index.is_none() && *self.swallow_files.lock() {
            return Ok(());
        }
        self.simulator.post_binary(envelope)
    }
}

/// Bridge whose binary channel is a [`ScriptedHost`].
pub fn binary_bridge(config: BridgeConfig, withhold_chunk: Option<u32>) -> (Arc<HostBridge>, Arc<ScriptedHost>) {
    let inbound = HostInbound::standalone();
    let host = Arc::new(ScriptedHost::new(inbound.clone(), &config, withhold_chunk));
    let bindings = HostBindings::empty().with_binary_channel(host.clone());
    let bridge = HostBridge::with_inbound(config, bindings, inbound)
        .expect("valid test config");
    (Arc::new(bridge), host)
}

/// Bridge whose text-only notify channel is a [`ScriptedHost`].
pub fn text_bridge(config: BridgeConfig) -> (Arc<HostBridge>, Arc<ScriptedHost>) {
    let inbound = HostInbound::standalone();
    let host = Arc::new(ScriptedHost::new(inbound.clone(), &config, None));
    let bindings = HostBindings::empty().with_notify_channel(host.clone());
    let bridge = HostBridge::with_inbound(config, bindings, inbound)
        .expect("valid test config");
    (Arc::new(bridge), host)
}
