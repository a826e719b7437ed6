//! Adapters: host bindings, inbound routing, storage and the simulated host.

pub mod inbound;
pub mod simulator;
pub mod storage;
pub mod transport;

pub use inbound::HostInbound;
pub use simulator::HostSimulator;
pub use storage::{FileBackedKVStore, InMemoryKVStore};
pub use transport::{HostBindings, TransportDetector};
