//! Ports (hexagonal architecture boundaries).

pub mod outbound;

pub use outbound::{HostChannel, KVStoreError, KeyValueStore, TransportError};
