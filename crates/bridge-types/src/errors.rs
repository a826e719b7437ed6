//! # Error Types
//!
//! Errors raised while building or decoding wire envelopes.

use thiserror::Error;

/// Errors from envelope encoding/decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The base64 body could not be decoded.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// A `data:` URL without the `;base64,` marker.
    #[error("malformed data URL: missing base64 marker")]
    MalformedDataUrl,
}
