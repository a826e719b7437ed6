//! Host bridge service.
//!
//! Wires transport detection, the correlator, the side channel and (when no
//! host is present) the simulated host, and exposes `call_host`.

use crate::adapters::inbound::HostInbound;
use crate::adapters::simulator::HostSimulator;
use crate::adapters::transport::{HostBindings, TransportDetector};
use crate::domain::config::BridgeConfig;
use crate::domain::error::BridgeError;
use crate::domain::pending::CallbackCorrelator;
use crate::domain::ConfigError;
use crate::ports::outbound::HostChannel;
use bridge_bus::SideChannelBus;
use bridge_types::{BinaryEnvelope, CorrelationId, HostMessage, HostMethod, TransportCapability};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Async request/response over a one-way host transport.
pub struct HostBridge {
    config: BridgeConfig,
    capability: TransportCapability,
    channel: Arc<dyn HostChannel>,
    inbound: HostInbound,
    simulator: Option<Arc<HostSimulator>>,
}

impl HostBridge {
    /// Build a bridge with its own correlator and side channel.
    pub fn connect(config: BridgeConfig, bindings: HostBindings) -> Result<Self, ConfigError> {
        Self::with_inbound(config, bindings, HostInbound::standalone())
    }

    /// Build a bridge around an existing inbound path.
    ///
    /// Use this when the host shell's callbacks were wired to `inbound`
    /// before the bridge existed.
    pub fn with_inbound(
        config: BridgeConfig,
        bindings: HostBindings,
        inbound: HostInbound,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let detector = TransportDetector::new(bindings);
        let capability = detector.detect();

        let (channel, simulator) = match detector.select() {
            Some(channel) => (channel, None),
            None => {
                let simulator = Arc::new(HostSimulator::from_config(
                    inbound.clone(),
                    config.simulator.clone(),
                )?);
                let channel: Arc<dyn HostChannel> = simulator.clone();
                (channel, Some(simulator))
            }
        };

        info!(
            capability = %capability,
            simulated = simulator.is_some(),
            chunk_size = config.upload.chunk_size,
            "Host bridge connected"
        );

        Ok(Self {
            config,
            capability,
            channel,
            inbound,
            simulator,
        })
    }

    /// Send a request and wait for its completion.
    ///
    /// Fails only if the message cannot be dispatched. Whatever the host
    /// answers, including `null` or `false`, is returned as `Ok`.
    pub async fn call_host(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let correlator = self.inbound.correlator();
        let (correlation_id, receiver) = correlator.register(method);

        if let Err(e) = self.dispatch(method, params, &correlation_id) {
            correlator.cancel(&correlation_id);
            warn!(
                method,
                correlation_id = %correlation_id,
                error = %e,
                "Host call dispatch failed"
            );
            return Err(e);
        }

        receiver
            .await
            .map_err(|_| BridgeError::CompletionDropped { correlation_id })
    }

    /// [`Self::call_host`] with typed parameters.
    pub async fn call<P: Serialize>(&self, method: HostMethod, params: &P) -> Result<Value, BridgeError> {
        let params = serde_json::to_value(params)?;
        self.call_host(method.as_str(), params).await
    }

    /// Post a raw binary frame. Only valid on a binary-capable transport.
    pub fn post_binary(&self, envelope: BinaryEnvelope) -> Result<(), BridgeError> {
        if !self.capability.supports_binary() {
            return Err(BridgeError::Dispatch {
                method: format!("{:?}", envelope.method),
                reason: format!("{} transport carries no binary frames", self.capability),
            });
        }
        debug!(
            method = ?envelope.method,
            file_id = %envelope.file_id,
            chunk_index = ?envelope.chunk_index,
            bytes = envelope.body.len(),
            "Posting binary frame"
        );
        self.channel.post_binary(envelope)?;
        Ok(())
    }

    fn dispatch(&self, method: &str, params: Value, correlation_id: &CorrelationId) -> Result<(), BridgeError> {
        if self.simulator.is_some() && Handle::try_current().is_err() {
            return Err(BridgeError::NoRuntime {
                method: method.to_string(),
            });
        }

        let message = HostMessage::new(method, params, correlation_id.clone()).to_json()?;
        debug!(
            method,
            correlation_id = %correlation_id,
            capability = %self.capability,
            "Dispatching host call"
        );
        self.channel.post_message(&message)?;
        Ok(())
    }

    /// The transport chosen at connect time.
    pub fn capability(&self) -> TransportCapability {
        self.capability
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Entry point for host completions and side-channel events.
    pub fn inbound(&self) -> &HostInbound {
        &self.inbound
    }

    pub fn correlator(&self) -> &Arc<CallbackCorrelator> {
        self.inbound.correlator()
    }

    pub fn bus(&self) -> &Arc<SideChannelBus> {
        self.inbound.bus()
    }

    /// The simulated host, when no real host is bound.
    pub fn simulator(&self) -> Option<&Arc<HostSimulator>> {
        self.simulator.as_ref()
    }
}
