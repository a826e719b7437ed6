//! # Bridge Types Crate
//!
//! Wire-level types shared by the request channel, the uploader, the
//! side-channel bus and the simulated host.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: method names, parameter shapes and envelope
//!   layouts are defined once here and consumed by both sides of the bridge.
//! - **Opaque Results**: completion results stay `serde_json::Value`; domain
//!   documents (`works.json`, `materials.json`, ...) are never inspected.
//! - **Capability-Driven Encoding**: payload encoding is chosen by
//!   [`TransportCapability`] through a single [`encode`] function.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod capability;
pub mod correlation;
pub mod envelope;
pub mod errors;
pub mod message;

pub use capability::TransportCapability;
pub use correlation::CorrelationId;
pub use envelope::{
    decode_data_url, encode, to_data_url, BinaryEnvelope, BinaryMethod, TransportEnvelope,
};
pub use errors::EnvelopeError;
pub use message::*;

/// Content type used when the caller does not know one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
