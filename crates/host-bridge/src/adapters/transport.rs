//! Host bindings and transport detection.
//!
//! The shell may expose up to three one-way primitives. The embedder hands
//! them over as [`HostBindings`]; [`TransportDetector`] picks one, once.

use crate::ports::outbound::HostChannel;
use bridge_types::TransportCapability;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// The primitives the host shell exposes, one slot per capability.
#[derive(Clone, Default)]
pub struct HostBindings {
    binary: Option<Arc<dyn HostChannel>>,
    notify: Option<Arc<dyn HostChannel>>,
    legacy: Option<Arc<dyn HostChannel>>,
}

impl HostBindings {
    /// No host present.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Channel accepting both text and raw binary frames.
    #[must_use]
    pub fn with_binary_channel(mut self, channel: Arc<dyn HostChannel>) -> Self {
        self.binary = Some(channel);
        self
    }

    /// Text-only `postMessage`-style channel.
    #[must_use]
    pub fn with_notify_channel(mut self, channel: Arc<dyn HostChannel>) -> Self {
        self.notify = Some(channel);
        self
    }

    /// Older object-bridge channel, text only.
    #[must_use]
    pub fn with_legacy_bridge(mut self, channel: Arc<dyn HostChannel>) -> Self {
        self.legacy = Some(channel);
        self
    }

    fn channel_for(&self, capability: TransportCapability) -> Option<Arc<dyn HostChannel>> {
        match capability {
            TransportCapability::BinaryChannel => self.binary.clone(),
            TransportCapability::NotifyChannel => self.notify.clone(),
            TransportCapability::LegacyBridge => self.legacy.clone(),
            TransportCapability::None => None,
        }
    }
}

impl std::fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBindings")
            .field("binary", &self.binary.is_some())
            .field("notify", &self.notify.is_some())
            .field("legacy", &self.legacy.is_some())
            .finish()
    }
}

/// Picks the transport once per bridge.
///
/// Priority: binary channel, notify channel, legacy bridge, none.
pub struct TransportDetector {
    bindings: HostBindings,
    detected: OnceLock<TransportCapability>,
}

impl TransportDetector {
    pub fn new(bindings: HostBindings) -> Self {
        Self {
            bindings,
            detected: OnceLock::new(),
        }
    }

    /// The capability in use. Computed on first call and then fixed.
    pub fn detect(&self) -> TransportCapability {
        *self.detected.get_or_init(|| {
            let capability = if self.bindings.binary.is_some() {
                TransportCapability::BinaryChannel
            } else if self.bindings.notify.is_some() {
                TransportCapability::NotifyChannel
            } else if self.bindings.legacy.is_some() {
                TransportCapability::LegacyBridge
            } else {
                TransportCapability::None
            };

            if capability.has_host() {
                info!(capability = %capability, "Host transport detected");
            } else {
                warn!("No host transport available; using simulated host");
            }
            capability
        })
    }

    /// The channel for the detected capability, `None` when there is no host.
    pub fn select(&self) -> Option<Arc<dyn HostChannel>> {
        self.bindings.channel_for(self.detect())
    }
}
