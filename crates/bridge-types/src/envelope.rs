//! # Transport Envelopes
//!
//! Two encodings carry file bytes across the bridge:
//!
//! - **Binary**: raw bytes posted on a binary-capable channel, framed by a
//!   [`BinaryEnvelope`] header (method, file id, chunk position).
//! - **Base64**: a `data:<type>;base64,<payload>` URL embedded in a normal
//!   JSON request.
//!
//! Upload code is written once against [`TransportEnvelope`]; [`encode`]
//! picks the variant from the detected capability.

use crate::capability::TransportCapability;
use crate::errors::EnvelopeError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Binary frame kinds accepted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryMethod {
    /// Whole file previously announced with `prepareFileBinary`.
    UploadFileBinary,
    /// One chunk of an `initChunkUpload` session.
    UploadChunkBinary,
}

/// A raw binary frame.
///
/// There is no callback id: acknowledgement arrives through the side
/// channel, keyed by `file_id` (and `chunk_index` for chunks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryEnvelope {
    pub method: BinaryMethod,
    pub file_id: String,
    pub chunk_index: Option<u32>,
    pub total_chunks: Option<u32>,
    pub body: Bytes,
}

impl BinaryEnvelope {
    /// Frame for a whole prepared file.
    pub fn file(file_id: impl Into<String>, body: Bytes) -> Self {
        Self {
            method: BinaryMethod::UploadFileBinary,
            file_id: file_id.into(),
            chunk_index: None,
            total_chunks: None,
            body,
        }
    }

    /// Frame for one chunk of a session.
    pub fn chunk(file_id: impl Into<String>, chunk_index: u32, total_chunks: u32, body: Bytes) -> Self {
        Self {
            method: BinaryMethod::UploadChunkBinary,
            file_id: file_id.into(),
            chunk_index: Some(chunk_index),
            total_chunks: Some(total_chunks),
            body,
        }
    }

    /// Header fields as the host sees them next to the binary body.
    #[must_use]
    pub fn header(&self) -> Value {
        let mut header = json!({
            "method": self.method,
            "fileId": self.file_id,
        });
        if let Some(index) = self.chunk_index {
            header["chunkIndex"] = json!(index);
        }
        if let Some(total) = self.total_chunks {
            header["totalChunks"] = json!(total);
        }
        header
    }
}

/// Capability-neutral encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEnvelope {
    Binary(Bytes),
    Base64(String),
}

impl TransportEnvelope {
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

/// Encode a payload for the given capability.
///
/// Only [`TransportCapability::BinaryChannel`] gets raw bytes; every other
/// capability (including the simulator) gets a base64 data URL.
pub fn encode(capability: TransportCapability, content_type: &str, payload: Bytes) -> TransportEnvelope {
    if capability.supports_binary() {
        TransportEnvelope::Binary(payload)
    } else {
        TransportEnvelope::Base64(to_data_url(content_type, &payload))
    }
}

/// Render bytes as a `data:` URL.
pub fn to_data_url(content_type: &str, payload: &[u8]) -> String {
    let content_type = if content_type.is_empty() {
        crate::DEFAULT_CONTENT_TYPE
    } else {
        content_type
    };
    format!("data:{};base64,{}", content_type, BASE64.encode(payload))
}

/// Decode a `data:` URL, or a bare base64 string.
pub fn decode_data_url(encoded: &str) -> Result<Vec<u8>, EnvelopeError> {
    let body = if encoded.starts_with("data:") {
        let (_, body) = encoded
            .split_once(";base64,")
            .ok_or(EnvelopeError::MalformedDataUrl)?;
        body
    } else {
        encoded
    };
    BASE64
        .decode(body)
        .map_err(|e| EnvelopeError::InvalidBase64(e.to_string()))
}
