//! # Bridge Bus - Side Channel for Binary Acknowledgements
//!
//! Binary frames posted to the host carry no callback id, so the host
//! acknowledges them out of band with `{fileId, chunkIndex?, method, path?}`
//! events. This crate is that out-of-band path.
//!
//! ```text
//! ┌──────────────┐   subscribe(filter)   ┌──────────────┐
//! │   Uploader   │ ────────────────────→ │ SideChannel  │
//! │              │ ←──── first match ─── │     Bus      │
//! └──────────────┘                       └──────────────┘
//!                                               ↑
//!                                  publish()    │
//!                          ┌────────────────────┘
//!                   Host / HostSimulator
//! ```
//!
//! ## Subscription Lifecycle
//!
//! - Subscribe **before** posting the binary frame, so the ack cannot be
//!   missed.
//! - A [`Subscription`] deregisters itself on drop: after the first match, on
//!   timeout, or when the awaiting future is cancelled.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{AckFilter, AckKind, HostEvent};
pub use publisher::{EventPublisher, SideChannelBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events buffered per subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
