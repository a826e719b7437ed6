//! Simulated host.
//!
//! Stands in for the desktop shell when no host binding is present. It
//! answers the full method surface against a [`KeyValueStore`] and replies
//! the way the real host does: completions after `response_delay` through
//! [`HostInbound::receive_from_host`], binary acknowledgements after
//! `ack_delay` on the side channel. Nothing resolves synchronously.
//!
//! Store layout:
//!
//! | Key | Value |
//! |-----|-------|
//! | `mock_{fileName}` | JSON document text |
//! | `file_cache_{subDir}/{identifier}` | cached asset path |
//! | `asset_{path}` | stored file bytes |
//! | `asset_type_{path}` | content type of the stored file |
//! | `dir_{name}` | marker for an initialized directory |

use crate::adapters::inbound::HostInbound;
use crate::adapters::storage::{FileBackedKVStore, InMemoryKVStore};
use crate::domain::config::SimulatorConfig;
use crate::domain::error::SimulatorError;
use crate::ports::outbound::{HostChannel, KVStoreError, KeyValueStore, TransportError};
use bridge_bus::HostEvent;
use bridge_types::{
    decode_data_url, to_data_url, BinaryEnvelope, BinaryMethod, CheckFileExistsParams,
    CompleteChunkUploadParams, CorrelationId, CreateThumbnailParams, DeleteFileParams,
    GetFileUrlParams, HostCompletion, HostMessage, HostMethod, InitChunkUploadParams,
    InitializeDirectoriesParams, PrepareFileBinaryParams, ReadJsonFileParams,
    RegisterFileCacheParams, SaveFileParams, SaveJsonFileParams, UploadChunkParams,
    DEFAULT_CONTENT_TYPE,
};
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use uuid::Uuid;

const DOCUMENT_PREFIX: &str = "mock_";
const CACHE_PREFIX: &str = "file_cache_";
const ASSET_PREFIX: &str = "asset_";
const ASSET_TYPE_PREFIX: &str = "asset_type_";
const DIR_PREFIX: &str = "dir_";

/// A chunk session opened by `initChunkUpload`.
struct UploadSession {
    file_name: String,
    sub_dir: String,
    content_type: String,
    total_chunks: u32,
    chunks: BTreeMap<u32, Bytes>,
}

/// A file announced by `prepareFileBinary`, waiting for its bytes.
struct PreparedFile {
    file_name: String,
    sub_dir: String,
    content_type: String,
}

struct SimulatorState {
    store: Box<dyn KeyValueStore>,
    sessions: HashMap<String, UploadSession>,
    prepared: HashMap<String, PreparedFile>,
}

/// In-process host with the same asynchronous behaviour as the shell.
#[derive(Clone)]
pub struct HostSimulator {
    inbound: HostInbound,
    config: SimulatorConfig,
    state: Arc<Mutex<SimulatorState>>,
}

impl HostSimulator {
    pub fn new(inbound: HostInbound, config: SimulatorConfig, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            inbound,
            config,
            state: Arc::new(Mutex::new(SimulatorState {
                store,
                sessions: HashMap::new(),
                prepared: HashMap::new(),
            })),
        }
    }

    /// Build with the store named by `config.store_path`, or in memory.
    pub fn from_config(inbound: HostInbound, config: SimulatorConfig) -> Result<Self, KVStoreError> {
        let store: Box<dyn KeyValueStore> = match &config.store_path {
            Some(path) => Box::new(FileBackedKVStore::open(path)?),
            None => Box::new(InMemoryKVStore::new()),
        };
        info!(
            persistent = config.store_path.is_some(),
            response_delay_ms = config.response_delay.as_millis(),
            "Simulated host ready"
        );
        Ok(Self::new(inbound, config, store))
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Bytes stored at `path` by a save, a chunk session or a thumbnail.
    pub fn stored_file(&self, path: &str) -> Option<Bytes> {
        let state = self.state.lock();
        state
            .store
            .get(asset_key(path).as_bytes())
            .ok()
            .flatten()
            .map(Bytes::from)
    }

    /// Paths of stored files under `prefix` (e.g. `assets/panoramas/`), sorted.
    pub fn stored_paths(&self, prefix: &str) -> Vec<String> {
        let state = self.state.lock();
        let scan_prefix = asset_key(prefix);
        let mut paths: Vec<String> = state
            .store
            .prefix_scan(scan_prefix.as_bytes())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|key| String::from_utf8(key).ok())
            .filter(|key| !key.starts_with(ASSET_TYPE_PREFIX))
            .filter_map(|key| key.strip_prefix(ASSET_PREFIX).map(str::to_string))
            .collect();
        paths.sort();
        paths
    }

    /// Number of chunk sessions opened and not yet completed.
    pub fn open_sessions(&self) -> usize {
        self.state.lock().sessions.len()
    }

    // =========================================================================
    // METHOD SURFACE
    // =========================================================================

    /// Apply one request to the store and produce its result.
    fn handle(&self, method: &str, params: Value) -> Result<Value, SimulatorError> {
        let Some(known) = HostMethod::from_wire(method) else {
            warn!(method, "Unknown host method");
            return Ok(Value::Null);
        };

        let mut state = self.state.lock();
        let state = &mut *state;

        let result = match known {
            HostMethod::InitializeDirectories => {
                let Some(p) = parse_params::<InitializeDirectoriesParams>(method, params) else {
                    return Ok(Value::Bool(false));
                };
                for dir in &p.dirs {
                    state.store.put(format!("{DIR_PREFIX}{dir}").as_bytes(), b"")?;
                }
                Value::Bool(true)
            }

            HostMethod::ReadJsonFile => {
                let Some(p) = parse_params::<ReadJsonFileParams>(method, params) else {
                    return Ok(Value::Null);
                };
                match state.store.get(document_key(&p.file_name).as_bytes())? {
                    Some(text) => serde_json::from_slice(&text)?,
                    None => Value::Null,
                }
            }

            HostMethod::SaveJsonFile => {
                let Some(p) = parse_params::<SaveJsonFileParams>(method, params) else {
                    return Ok(Value::Bool(false));
                };
                let text = serde_json::to_vec(&p.data)?;
                state.store.put(document_key(&p.file_name).as_bytes(), &text)?;
                Value::Bool(true)
            }

            HostMethod::SaveFile => {
                let Some(p) = parse_params::<SaveFileParams>(method, params) else {
                    return Ok(Value::Null);
                };
                match decode_data_url(&p.file_content) {
                    Ok(bytes) => {
                        let path = asset_path(&p.sub_dir, &p.file_name);
                        store_asset(state.store.as_mut(), &path, &p.content_type, &bytes)?;
                        Value::String(path)
                    }
                    Err(e) => {
                        warn!(file_name = %p.file_name, error = %e, "saveFile payload not decodable");
                        Value::Null
                    }
                }
            }

            HostMethod::DeleteFile => {
                let Some(p) = parse_params::<DeleteFileParams>(method, params) else {
                    return Ok(Value::Bool(false));
                };
                if p.path.ends_with(".json") {
                    let file_name = p.path.rsplit('/').next().unwrap_or(&p.path);
                    state.store.delete(document_key(file_name).as_bytes())?;
                } else {
                    state.store.delete(asset_key(&p.path).as_bytes())?;
                    state.store.delete(asset_type_key(&p.path).as_bytes())?;
                }
                Value::Bool(true)
            }

            HostMethod::CreateThumbnail => {
                let Some(p) = parse_params::<CreateThumbnailParams>(method, params) else {
                    return Ok(Value::Null);
                };
                let path = thumbnail_path(&p.image_path, p.width, p.height);
                if let Some(bytes) = state.store.get(asset_key(&p.image_path).as_bytes())? {
                    let content_type = state
                        .store
                        .get(asset_type_key(&p.image_path).as_bytes())?
                        .and_then(|t| String::from_utf8(t).ok())
                        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                    store_asset(state.store.as_mut(), &path, &content_type, &bytes)?;
                }
                Value::String(path)
            }

            HostMethod::InitChunkUpload => {
                let Some(p) = parse_params::<InitChunkUploadParams>(method, params) else {
                    return Ok(Value::Null);
                };
                let session_id = format!("chunk_{}", Uuid::new_v4().simple());
                debug!(
                    session_id = %session_id,
                    file_name = %p.file_name,
                    total_chunks = p.total_chunks,
                    total_size = p.total_size,
                    "Chunk session opened"
                );
                state.sessions.insert(
                    session_id.clone(),
                    UploadSession {
                        file_name: p.file_name,
                        sub_dir: p.sub_dir,
                        content_type: p.content_type,
                        total_chunks: p.total_chunks,
                        chunks: BTreeMap::new(),
                    },
                );
                Value::String(session_id)
            }

            HostMethod::UploadChunk => {
                let Some(p) = parse_params::<UploadChunkParams>(method, params) else {
                    return Ok(Value::Bool(false));
                };
                let Some(session) = state.sessions.get_mut(&p.file_id) else {
                    warn!(file_id = %p.file_id, "Chunk for unknown session");
                    return Ok(Value::Bool(false));
                };
                match decode_data_url(&p.chunk) {
                    Ok(bytes) => {
                        session.chunks.insert(p.chunk_index, Bytes::from(bytes));
                        debug!(
                            file_id = %p.file_id,
                            chunk = p.chunk_index + 1,
                            total_chunks = p.total_chunks,
                            "Chunk received"
                        );
                        Value::Bool(true)
                    }
                    Err(e) => {
                        warn!(file_id = %p.file_id, chunk_index = p.chunk_index, error = %e, "Chunk not decodable");
                        Value::Bool(false)
                    }
                }
            }

            HostMethod::CompleteChunkUpload => {
                let Some(p) = parse_params::<CompleteChunkUploadParams>(method, params) else {
                    return Ok(Value::Null);
                };
                let Some(session) = state.sessions.remove(&p.file_id) else {
                    warn!(file_id = %p.file_id, "Completion for unknown session");
                    return Ok(Value::Null);
                };
                match assemble(&session) {
                    Some(bytes) => {
                        let path = asset_path(&session.sub_dir, &session.file_name);
                        store_asset(state.store.as_mut(), &path, &session.content_type, &bytes)?;
                        info!(file_id = %p.file_id, path = %path, bytes = bytes.len(), "Chunk session completed");
                        Value::String(path)
                    }
                    None => {
                        warn!(
                            file_id = %p.file_id,
                            received = session.chunks.len(),
                            total_chunks = session.total_chunks,
                            "Chunk session incomplete"
                        );
                        Value::Null
                    }
                }
            }

            HostMethod::CheckFileExists => {
                let Some(p) = parse_params::<CheckFileExistsParams>(method, params) else {
                    return Ok(Value::Null);
                };
                state
                    .store
                    .get(cache_key(&p.sub_dir, &p.identifier).as_bytes())?
                    .and_then(|path| String::from_utf8(path).ok())
                    .map_or(Value::Null, Value::String)
            }

            HostMethod::RegisterFileCache => {
                let Some(p) = parse_params::<RegisterFileCacheParams>(method, params) else {
                    return Ok(Value::Bool(false));
                };
                let Some(sub_dir) = asset_sub_dir(&p.path) else {
                    warn!(path = %p.path, "Cache registration for a path outside assets/");
                    return Ok(Value::Bool(false));
                };
                state
                    .store
                    .put(cache_key(sub_dir, &p.identifier).as_bytes(), p.path.as_bytes())?;
                Value::Bool(true)
            }

            HostMethod::PrepareFileBinary => {
                let Some(p) = parse_params::<PrepareFileBinaryParams>(method, params) else {
                    return Ok(Value::Null);
                };
                let file_id = format!("file_{}", Uuid::new_v4().simple());
                debug!(file_id = %file_id, file_name = %p.file_name, size = p.size, "Binary file prepared");
                state.prepared.insert(
                    file_id.clone(),
                    PreparedFile {
                        file_name: p.file_name,
                        sub_dir: p.sub_dir,
                        content_type: p.content_type,
                    },
                );
                Value::String(file_id)
            }

            HostMethod::GetFileUrl => {
                let Some(p) = parse_params::<GetFileUrlParams>(method, params) else {
                    return Ok(Value::Null);
                };
                match state.store.get(asset_key(&p.path).as_bytes())? {
                    Some(bytes) => {
                        let content_type = state
                            .store
                            .get(asset_type_key(&p.path).as_bytes())?
                            .and_then(|t| String::from_utf8(t).ok())
                            .unwrap_or_default();
                        Value::String(to_data_url(&content_type, &bytes))
                    }
                    None => Value::Null,
                }
            }
        };

        Ok(result)
    }

    /// Store a binary frame and produce the acknowledgement to publish.
    fn handle_binary(&self, envelope: BinaryEnvelope) -> Result<HostEvent, TransportError> {
        let mut state = self.state.lock();
        let state = &mut *state;

        match envelope.method {
            BinaryMethod::UploadFileBinary => {
                let Some(prepared) = state.prepared.remove(&envelope.file_id) else {
                    return Err(TransportError::Rejected(format!(
                        "file {} was not prepared",
                        envelope.file_id
                    )));
                };
                let path = asset_path(&prepared.sub_dir, &prepared.file_name);
                store_asset(
                    state.store.as_mut(),
                    &path,
                    &prepared.content_type,
                    &envelope.body,
                )
                .map_err(|e| TransportError::Rejected(e.to_string()))?;
                Ok(HostEvent::file_saved(envelope.file_id, path))
            }
            BinaryMethod::UploadChunkBinary => {
                let Some(index) = envelope.chunk_index else {
                    return Err(TransportError::Rejected("chunk frame without index".into()));
                };
                let Some(session) = state.sessions.get_mut(&envelope.file_id) else {
                    return Err(TransportError::Rejected(format!(
                        "unknown chunk session {}",
                        envelope.file_id
                    )));
                };
                session.chunks.insert(index, envelope.body);
                Ok(HostEvent::chunk_saved(envelope.file_id, index))
            }
        }
    }

    fn deliver_completion(&self, handle: &Handle, method: String, callback_id: CorrelationId, result: Value) {
        let inbound = self.inbound.clone();
        let delay = self.config.response_delay;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            match HostCompletion::new(callback_id, result).to_json() {
                Ok(payload) => {
                    inbound.receive_from_host(&method, &payload);
                }
                Err(e) => warn!(method = %method, error = %e, "Failed to serialize simulated completion"),
            }
        });
    }

    fn deliver_event(&self, handle: &Handle, event: HostEvent) {
        let inbound = self.inbound.clone();
        let delay = self.config.ack_delay;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            inbound.dispatch_event(event).await;
        });
    }
}

impl HostChannel for HostSimulator {
    fn post_message(&self, message: &str) -> Result<(), TransportError> {
        let handle = Handle::try_current().map_err(|_| TransportError::Closed)?;
        let message =
            HostMessage::from_json(message).map_err(|e| TransportError::Rejected(e.to_string()))?;

        debug!(method = %message.method, callback_id = %message.callback_id, "Simulated host received message");

        let result = match self.handle(&message.method, message.params) {
            Ok(result) => result,
            Err(e) => {
                warn!(method = %message.method, error = %e, "Simulated host failed to apply request");
                Value::Null
            }
        };

        self.deliver_completion(&handle, message.method, message.callback_id, result);
        Ok(())
    }

    fn post_binary(&self, envelope: BinaryEnvelope) -> Result<(), TransportError> {
        let handle = Handle::try_current().map_err(|_| TransportError::Closed)?;
        debug!(
            method = ?envelope.method,
            file_id = %envelope.file_id,
            chunk_index = ?envelope.chunk_index,
            bytes = envelope.body.len(),
            "Simulated host received binary frame"
        );

        let event = self.handle_binary(envelope)?;
        self.deliver_event(&handle, event);
        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_params<T: DeserializeOwned>(method: &str, params: Value) -> Option<T> {
    match serde_json::from_value(params) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(method, error = %e, "Invalid parameters");
            None
        }
    }
}

fn document_key(file_name: &str) -> String {
    format!("{DOCUMENT_PREFIX}{file_name}")
}

fn cache_key(sub_dir: &str, identifier: &str) -> String {
    format!("{CACHE_PREFIX}{sub_dir}/{identifier}")
}

/// `{subDir}` of an `assets/{subDir}/{file}` path.
fn asset_sub_dir(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("assets/")?;
    let (sub_dir, file) = rest.rsplit_once('/')?;
    (!sub_dir.is_empty() && !file.is_empty()).then_some(sub_dir)
}

fn asset_key(path: &str) -> String {
    format!("{ASSET_PREFIX}{path}")
}

fn asset_type_key(path: &str) -> String {
    format!("{ASSET_TYPE_PREFIX}{path}")
}

fn store_asset(
    store: &mut dyn KeyValueStore,
    path: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<(), KVStoreError> {
    store.put(asset_key(path).as_bytes(), bytes)?;
    store.put(asset_type_key(path).as_bytes(), content_type.as_bytes())
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// `assets/{sub_dir}/{epoch_ms}-{tag}-{file_name}`
///
/// `tag` is eight random hex digits, so same-named saves in one millisecond
/// land on distinct paths.
fn asset_path(sub_dir: &str, file_name: &str) -> String {
    let file_name = if file_name.is_empty() { "file" } else { file_name };
    let id = Uuid::new_v4().simple().to_string();
    format!("assets/{}/{}-{}-{}", sub_dir, epoch_ms(), &id[..8], file_name)
}

/// `assets/thumbnails/{stem}_{w}x{h}{.ext}`
fn thumbnail_path(image_path: &str, width: u32, height: u32) -> String {
    let file_name = image_path.rsplit('/').next().unwrap_or(image_path);
    let (stem, ext) = match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name.split_at(dot),
        _ => (file_name, ""),
    };
    format!("assets/thumbnails/{stem}_{width}x{height}{ext}")
}

/// Concatenate chunks `0..total_chunks`, or `None` if any is missing.
fn assemble(session: &UploadSession) -> Option<Bytes> {
    let mut bytes = BytesMut::new();
    for index in 0..session.total_chunks {
        bytes.extend_from_slice(session.chunks.get(&index)?);
    }
    Some(bytes.freeze())
}
