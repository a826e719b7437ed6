//! # Host Messages
//!
//! Defines the method surface exposed by the host and the JSON shapes that
//! cross the text transports.
//!
//! ## Wire Rules
//!
//! - Requests travel as `{"method", "params", "callbackId"}`.
//! - Completions come back as `{"callbackId", "result"}`; a missing `result`
//!   means `null`.
//! - Parameter objects use camelCase keys.

use crate::correlation::CorrelationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Methods understood by the host (and by the simulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMethod {
    InitializeDirectories,
    ReadJsonFile,
    SaveJsonFile,
    SaveFile,
    DeleteFile,
    CreateThumbnail,
    InitChunkUpload,
    UploadChunk,
    CompleteChunkUpload,
    CheckFileExists,
    RegisterFileCache,
    PrepareFileBinary,
    GetFileUrl,
}

impl HostMethod {
    /// Every method, in declaration order.
    pub const ALL: [HostMethod; 13] = [
        Self::InitializeDirectories,
        Self::ReadJsonFile,
        Self::SaveJsonFile,
        Self::SaveFile,
        Self::DeleteFile,
        Self::CreateThumbnail,
        Self::InitChunkUpload,
        Self::UploadChunk,
        Self::CompleteChunkUpload,
        Self::CheckFileExists,
        Self::RegisterFileCache,
        Self::PrepareFileBinary,
        Self::GetFileUrl,
    ];

    /// Wire name of the method.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitializeDirectories => "initializeDirectories",
            Self::ReadJsonFile => "readJsonFile",
            Self::SaveJsonFile => "saveJsonFile",
            Self::SaveFile => "saveFile",
            Self::DeleteFile => "deleteFile",
            Self::CreateThumbnail => "createThumbnail",
            Self::InitChunkUpload => "initChunkUpload",
            Self::UploadChunk => "uploadChunk",
            Self::CompleteChunkUpload => "completeChunkUpload",
            Self::CheckFileExists => "checkFileExists",
            Self::RegisterFileCache => "registerFileCache",
            Self::PrepareFileBinary => "prepareFileBinary",
            Self::GetFileUrl => "getFileUrl",
        }
    }

    /// Look up a method by wire name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for HostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the host. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMessage {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub callback_id: CorrelationId,
}

impl HostMessage {
    pub fn new(method: impl Into<String>, params: Value, callback_id: CorrelationId) -> Self {
        Self {
            method: method.into(),
            params,
            callback_id,
        }
    }

    /// Serialize to the text representation posted over the transport.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Out-of-band completion for a previously dispatched [`HostMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCompletion {
    pub callback_id: CorrelationId,
    #[serde(default)]
    pub result: Value,
}

impl HostCompletion {
    pub fn new(callback_id: CorrelationId, result: Value) -> Self {
        Self {
            callback_id,
            result,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// =============================================================================
// METHOD PARAMETERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeDirectoriesParams {
    pub dirs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadJsonFileParams {
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveJsonFileParams {
    pub file_name: String,
    #[serde(default)]
    pub data: Value,
}

/// Single-shot base64 save. `file_content` is a `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFileParams {
    pub file_content: String,
    pub file_name: String,
    pub sub_dir: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileParams {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThumbnailParams {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitChunkUploadParams {
    pub file_name: String,
    pub sub_dir: String,
    pub content_type: String,
    pub total_chunks: u32,
    pub total_size: u64,
}

/// Base64 chunk. The session id travels as `fileId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadChunkParams {
    pub file_id: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub chunk: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteChunkUploadParams {
    pub file_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFileExistsParams {
    pub identifier: String,
    pub sub_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFileCacheParams {
    pub path: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareFileBinaryParams {
    pub file_name: String,
    pub sub_dir: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFileUrlParams {
    pub path: String,
}
