//! Correlation ID for request tracking.
//!
//! Issued ids have the form `cb_<n>` where `n` comes from the issuing
//! correlator's monotonic counter. Ids received from the host are kept
//! verbatim, so stale ids from an earlier process still parse and are simply
//! never matched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace prefix for ids issued by this process.
pub const CORRELATION_PREFIX: &str = "cb_";

/// Opaque token linking a dispatched request to its completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Build the id for a counter value.
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("{CORRELATION_PREFIX}{sequence}"))
    }

    /// Wrap an id received from the host.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Counter value, if this id was issued in the `cb_<n>` namespace.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.0
            .strip_prefix(CORRELATION_PREFIX)
            .and_then(|n| n.parse().ok())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
