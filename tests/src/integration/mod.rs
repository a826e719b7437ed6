//! # Integration Scenarios
//!
//! End-to-end flows through `HostBridge`, the side channel and a host
//! (simulated or scripted behind a real binding).

pub mod chunked_upload;
pub mod correlation;
pub mod identity_cache;
