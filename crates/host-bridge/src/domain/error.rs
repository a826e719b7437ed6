//! Bridge error types.
//!
//! Two layers fail differently:
//!
//! - [`BridgeError`]: a request could not be dispatched. Completions are never
//!   errors; whatever the host sends back is returned as a value.
//! - [`UploadError`]: a multi-step upload stopped before producing a path.
//!
//! The facade in [`crate::file_system`] turns both into logged `None`/`false`.

use crate::ports::outbound::{KVStoreError, TransportError};
use bridge_types::{CorrelationId, EnvelopeError};
use std::time::Duration;
use thiserror::Error;

/// Failure to put a request on the wire.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No channel accepted the message.
    #[error("cannot dispatch {method}: {reason}")]
    Dispatch { method: String, reason: String },

    #[error("failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The simulated host needs a Tokio runtime to schedule completions.
    #[error("no async runtime available to deliver {method}")]
    NoRuntime { method: String },

    /// The correlator dropped the completion sender without resolving it.
    #[error("completion for {correlation_id} was dropped")]
    CompletionDropped { correlation_id: CorrelationId },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Failure of a save or chunked upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The payload needs more chunks than a `u32` index can address.
    #[error("{file_name} ({size} bytes) needs too many chunks of {chunk_size} bytes")]
    PayloadTooLarge {
        file_name: String,
        size: u64,
        chunk_size: usize,
    },

    /// `initChunkUpload` returned something other than a session id.
    #[error("host refused chunk session for {file_name}")]
    SessionInit { file_name: String },

    /// `prepareFileBinary` returned something other than a file id.
    #[error("host refused binary file {file_name}")]
    PrepareFailed { file_name: String },

    #[error("chunk {chunk_index} of {file_id} not acknowledged within {timeout:?}")]
    ChunkTimeout {
        file_id: String,
        chunk_index: u32,
        timeout: Duration,
    },

    #[error("file {file_id} not acknowledged within {timeout:?}")]
    FileAckTimeout { file_id: String, timeout: Duration },

    /// The host answered a base64 chunk with `false`.
    #[error("host rejected chunk {chunk_index} of {file_id}")]
    ChunkRejected { file_id: String, chunk_index: u32 },

    /// `completeChunkUpload` or `saveFile` produced no path.
    #[error("host returned no path for {file_id}")]
    Finalize { file_id: String },

    /// The side channel went away while waiting for an acknowledgement.
    #[error("side channel closed while waiting on {file_id}")]
    AckChannelClosed { file_id: String },

    #[error("failed to read payload: {0}")]
    Read(#[from] EnvelopeError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl From<TransportError> for UploadError {
    fn from(err: TransportError) -> Self {
        Self::Bridge(BridgeError::Transport(err))
    }
}

/// Failure of the simulated host's storage.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("store error: {0}")]
    Store(#[from] KVStoreError),

    #[error("stored document is not valid JSON: {0}")]
    Document(#[from] serde_json::Error),
}
