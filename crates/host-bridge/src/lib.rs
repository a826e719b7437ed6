//! # Host Bridge
//!
//! Request/response, file transfer and caching over the one-way message
//! transport between the panorama editor and its desktop host shell.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       HostFileSystem                         │
//! │     JSON documents · uploads · thumbnails · file URLs        │
//! ├──────────────────────┬────────────────────┬──────────────────┤
//! │ BinaryChunkUploader  │ FileIdentityCache  │                  │
//! ├──────────────────────┴────────────────────┴──────────────────┤
//! │                  HostBridge::call_host                       │
//! │   CallbackCorrelator (cb_<n>)   ·   TransportDetector        │
//! └───────────────┬──────────────────────────────▲───────────────┘
//!                 │ post_message / post_binary   │ HostInbound
//!                 ▼                              │
//!     binary · notify · legacy channel, or HostSimulator
//!                                                │
//!                         completions ───────────┤
//!                  chunkSaved / fileSaved ── SideChannelBus
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let bridge = Arc::new(HostBridge::connect(BridgeConfig::from_env()?, HostBindings::empty())?);
//! let fs = HostFileSystem::new(bridge);
//! let works = fs.read_json_file("works.json", json!([])).await;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod file_system;
pub mod ports;
pub mod service;
pub mod upload;

pub use adapters::{
    FileBackedKVStore, HostBindings, HostInbound, HostSimulator, InMemoryKVStore,
    TransportDetector,
};
pub use cache::FileIdentityCache;
pub use domain::{
    BridgeConfig, BridgeError, CallbackCorrelator, ChunkPlan, ChunkSession, ConfigError,
    CorrelatorStats, LocalFile, SimulatorConfig, SimulatorError, UploadConfig, UploadError,
};
pub use file_system::{HostFileSystem, DEFAULT_THUMBNAIL_SIZE};
pub use ports::{HostChannel, KVStoreError, KeyValueStore, TransportError};
pub use service::HostBridge;
pub use upload::{chunk_count, BinaryChunkUploader, UploadRequest};
