//! Binary/base64 file transfer.
//!
//! Small payloads go in one shot; large ones through an
//! `initChunkUpload` → chunks → `completeChunkUpload` session with one chunk
//! in flight at a time. On a binary-capable transport bytes travel as raw
//! frames acknowledged on the side channel; otherwise as base64 `data:` URLs
//! inside ordinary host calls.

use crate::domain::error::UploadError;
use crate::domain::identity::LocalFile;
use crate::domain::session::{ChunkPlan, ChunkSession};
use crate::service::HostBridge;
use bridge_bus::{AckFilter, SubscriptionError};
use bridge_types::{
    encode, BinaryEnvelope, CompleteChunkUploadParams, HostMethod, InitChunkUploadParams,
    PrepareFileBinaryParams, SaveFileParams, TransportEnvelope, UploadChunkParams,
};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What to store and where.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub sub_dir: String,
    pub content_type: String,
    pub payload: Bytes,
}

impl UploadRequest {
    /// Upload `file` into `sub_dir`, optionally under another name.
    pub fn from_file(file: &LocalFile, sub_dir: &str, rename: Option<&str>) -> Self {
        Self {
            file_name: rename.unwrap_or(&file.name).to_string(),
            sub_dir: sub_dir.to_string(),
            content_type: file.content_type.clone(),
            payload: file.bytes.clone(),
        }
    }

    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }
}

/// Moves file bytes to the host.
pub struct BinaryChunkUploader {
    bridge: Arc<HostBridge>,
}

impl BinaryChunkUploader {
    pub fn new(bridge: Arc<HostBridge>) -> Self {
        Self { bridge }
    }

    fn chunk_size(&self) -> usize {
        self.bridge.config().upload.chunk_size
    }

    /// Store a file in one shot and return its host path.
    pub async fn save(&self, request: &UploadRequest) -> Result<String, UploadError> {
        let envelope = encode(
            self.bridge.capability(),
            &request.content_type,
            request.payload.clone(),
        );
        match envelope {
            TransportEnvelope::Binary(body) => self.save_binary(request, body).await,
            TransportEnvelope::Base64(data_url) => self.save_base64(request, data_url).await,
        }
    }

    /// Store a file, chunking it when it exceeds the configured chunk size.
    pub async fn save_large(&self, request: &UploadRequest) -> Result<String, UploadError> {
        if request.payload.len() <= self.chunk_size() {
            return self.save(request).await;
        }
        self.upload_chunked(request).await
    }

    async fn save_base64(&self, request: &UploadRequest, data_url: String) -> Result<String, UploadError> {
        let params = SaveFileParams {
            file_content: data_url,
            file_name: request.file_name.clone(),
            sub_dir: request.sub_dir.clone(),
            content_type: request.content_type.clone(),
        };
        let result = self.bridge.call(HostMethod::SaveFile, &params).await?;
        non_empty_string(result).ok_or_else(|| UploadError::Finalize {
            file_id: request.file_name.clone(),
        })
    }

    /// `prepareFileBinary`, then the raw frame, then wait for `fileSaved`.
    async fn save_binary(&self, request: &UploadRequest, body: Bytes) -> Result<String, UploadError> {
        let params = PrepareFileBinaryParams {
            file_name: request.file_name.clone(),
            sub_dir: request.sub_dir.clone(),
            content_type: request.content_type.clone(),
            size: request.size(),
        };
        let file_id = non_empty_string(
            self.bridge.call(HostMethod::PrepareFileBinary, &params).await?,
        )
        .ok_or_else(|| UploadError::PrepareFailed {
            file_name: request.file_name.clone(),
        })?;

        let timeout = self.bridge.config().upload.file_ack_timeout;
        let subscription = self.bridge.bus().subscribe(AckFilter::file(&file_id));
        self.bridge
            .post_binary(BinaryEnvelope::file(&file_id, body))?;

        let event = subscription
            .wait(timeout)
            .await
            .map_err(|e| ack_error(e, &file_id, None))?;

        debug!(file_id = %file_id, path = ?event.path, "Binary file acknowledged");
        event
            .path
            .filter(|p| !p.is_empty())
            .ok_or(UploadError::Finalize { file_id })
    }

    #[instrument(skip(self, request), fields(file_name = %request.file_name, size = request.payload.len()))]
    async fn upload_chunked(&self, request: &UploadRequest) -> Result<String, UploadError> {
        let plan = ChunkPlan::new(request.size(), self.chunk_size()).ok_or_else(|| {
            UploadError::PayloadTooLarge {
                file_name: request.file_name.clone(),
                size: request.size(),
                chunk_size: self.chunk_size(),
            }
        })?;

        let init = InitChunkUploadParams {
            file_name: request.file_name.clone(),
            sub_dir: request.sub_dir.clone(),
            content_type: request.content_type.clone(),
            total_chunks: plan.total_chunks,
            total_size: plan.total_size,
        };
        let session_id = non_empty_string(
            self.bridge.call(HostMethod::InitChunkUpload, &init).await?,
        )
        .ok_or_else(|| UploadError::SessionInit {
            file_name: request.file_name.clone(),
        })?;

        info!(session_id = %session_id, total_chunks = plan.total_chunks, "Chunk upload started");

        let mut session = ChunkSession::new(
            session_id,
            &request.file_name,
            &request.sub_dir,
            &request.content_type,
            plan,
        );

        while let Some(index) = session.next_index() {
            let body = plan.slice(&request.payload, index);
            self.send_chunk(&session, index, body).await?;
            session.acknowledge();
        }

        let complete = CompleteChunkUploadParams {
            file_id: session.session_id.clone(),
        };
        let result = self.bridge.call(HostMethod::CompleteChunkUpload, &complete).await?;
        let path = non_empty_string(result).ok_or_else(|| UploadError::Finalize {
            file_id: session.session_id.clone(),
        })?;

        session.mark_completed();
        info!(session_id = %session.session_id, path = %path, "Chunk upload completed");
        Ok(path)
    }

    /// Send one chunk and wait until the host has it.
    async fn send_chunk(&self, session: &ChunkSession, index: u32, body: Bytes) -> Result<(), UploadError> {
        let file_id = &session.session_id;
        let total_chunks = session.plan.total_chunks;

        match encode(self.bridge.capability(), &session.content_type, body) {
            TransportEnvelope::Binary(body) => {
                let timeout = self.bridge.config().upload.chunk_ack_timeout;
                let subscription = self.bridge.bus().subscribe(AckFilter::chunk(file_id, index));
                self.bridge
                    .post_binary(BinaryEnvelope::chunk(file_id, index, total_chunks, body))?;
                subscription
                    .wait(timeout)
                    .await
                    .map_err(|e| ack_error(e, file_id, Some(index)))?;
            }
            TransportEnvelope::Base64(chunk) => {
                let params = UploadChunkParams {
                    file_id: file_id.clone(),
                    chunk_index: index,
                    total_chunks,
                    chunk,
                };
                let result = self.bridge.call(HostMethod::UploadChunk, &params).await?;
                if result == Value::Bool(false) {
                    return Err(UploadError::ChunkRejected {
                        file_id: file_id.clone(),
                        chunk_index: index,
                    });
                }
            }
        }

        debug!(file_id = %file_id, chunk = index + 1, total_chunks, "Chunk acknowledged");
        Ok(())
    }
}

fn non_empty_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn ack_error(err: SubscriptionError, file_id: &str, chunk_index: Option<u32>) -> UploadError {
    let file_id = file_id.to_string();
    match (err, chunk_index) {
        (SubscriptionError::TimedOut(timeout), Some(chunk_index)) => UploadError::ChunkTimeout {
            file_id,
            chunk_index,
            timeout,
        },
        (SubscriptionError::TimedOut(timeout), None) => UploadError::FileAckTimeout { file_id, timeout },
        (SubscriptionError::Closed, _) => UploadError::AckChannelClosed { file_id },
    }
}

/// Chunk count a payload of `size` bytes needs at `chunk_size`, if it fits
/// in a `u32` index.
pub fn chunk_count(size: u64, chunk_size: usize) -> Option<u32> {
    ChunkPlan::new(size, chunk_size).map(|plan| plan.total_chunks)
}
