//! # Side-Channel Events
//!
//! Acknowledgements the host emits for binary frames.

use serde::{Deserialize, Serialize};

/// Kind of acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AckKind {
    /// One chunk of a session was written.
    ChunkSaved,
    /// A prepared file was written; `path` holds the stored location.
    FileSaved,
}

/// Event delivered out of band from the completion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEvent {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
    pub method: AckKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl HostEvent {
    pub fn chunk_saved(file_id: impl Into<String>, chunk_index: u32) -> Self {
        Self {
            file_id: file_id.into(),
            chunk_index: Some(chunk_index),
            method: AckKind::ChunkSaved,
            path: None,
        }
    }

    pub fn file_saved(file_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            chunk_index: None,
            method: AckKind::FileSaved,
            path: Some(path.into()),
        }
    }
}

/// Predicate selecting exactly one acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckFilter {
    pub file_id: String,
    pub chunk_index: Option<u32>,
    pub kind: AckKind,
}

impl AckFilter {
    /// Match `{fileId, chunkIndex, method: chunkSaved}`.
    pub fn chunk(file_id: impl Into<String>, chunk_index: u32) -> Self {
        Self {
            file_id: file_id.into(),
            chunk_index: Some(chunk_index),
            kind: AckKind::ChunkSaved,
        }
    }

    /// Match `{fileId, method: fileSaved}`.
    pub fn file(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            chunk_index: None,
            kind: AckKind::FileSaved,
        }
    }

    /// Check if an event matches this filter.
    ///
    /// A chunk filter requires the exact chunk index; a file filter ignores it.
    #[must_use]
    pub fn matches(&self, event: &HostEvent) -> bool {
        if event.file_id != self.file_id || event.method != self.kind {
            return false;
        }
        match self.chunk_index {
            Some(index) => event.chunk_index == Some(index),
            None => true,
        }
    }
}
