//! # Transport Capability
//!
//! Which one-way messaging primitive the host embedding exposes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Messaging primitive offered by the host shell.
///
/// Variants are declared in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportCapability {
    /// WebView2-style `postMessage` that also accepts raw binary frames.
    BinaryChannel,
    /// Legacy `external.notify` text channel.
    NotifyChannel,
    /// Alternate embedding binding (CefSharp-style `postMessage`).
    LegacyBridge,
    /// No privileged host; calls are served by the simulator.
    None,
}

impl TransportCapability {
    /// Whether payloads may travel as raw bytes instead of base64 text.
    #[must_use]
    pub fn supports_binary(self) -> bool {
        matches!(self, Self::BinaryChannel)
    }

    /// Whether a privileged host is present at all.
    #[must_use]
    pub fn has_host(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Short label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BinaryChannel => "binary-channel",
            Self::NotifyChannel => "notify-channel",
            Self::LegacyBridge => "legacy-bridge",
            Self::None => "none",
        }
    }
}

impl fmt::Display for TransportCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
