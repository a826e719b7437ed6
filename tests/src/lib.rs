//! # Pano Bridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Scripted host, configs, payloads
//! └── integration/      # End-to-end bridge scenarios
//!     ├── correlation.rs
//!     ├── chunked_upload.rs
//!     ├── failure_paths.rs
//!     ├── identity_cache.rs
//!     └── simulated_host.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo test -p bridge-tests integration::chunked_upload
//! cargo bench -p bridge-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
