//! Outbound ports: what the bridge needs from its environment.
//!
//! - [`HostChannel`]: a one-way, fire-and-forget primitive toward the host.
//! - [`KeyValueStore`]: persistence for the simulated host.

use bridge_types::BinaryEnvelope;
use thiserror::Error;

// =============================================================================
// HOST CHANNEL
// =============================================================================

/// Errors raised by a channel when a frame is posted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The channel only carries text frames.
    #[error("channel does not accept binary frames")]
    BinaryUnsupported,

    /// The host side of the channel is gone.
    #[error("channel closed")]
    Closed,

    #[error("frame rejected: {0}")]
    Rejected(String),
}

/// One-way message primitive exposed by the host shell.
///
/// Posting never waits for the host. Replies come back through
/// [`crate::adapters::inbound::HostInbound`], either as a completion for a
/// text frame or as a side-channel event for a binary frame.
pub trait HostChannel: Send + Sync {
    /// Post a serialized `HostMessage`.
    fn post_message(&self, message: &str) -> Result<(), TransportError>;

    /// Post a raw binary frame.
    ///
    /// Only the binary channel overrides this.
    fn post_binary(&self, envelope: BinaryEnvelope) -> Result<(), TransportError> {
        let _ = envelope;
        Err(TransportError::BinaryUnsupported)
    }
}

// =============================================================================
// KEY-VALUE STORE
// =============================================================================

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    #[error("I/O error: {message}")]
    IOError { message: String },

    #[error("corrupted store file: {message}")]
    Corrupted { message: String },
}

/// Abstract interface for the simulated host's persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Removing a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// All keys starting with `prefix`, in no particular order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, KVStoreError>;
}
