//! Client-side view of a chunk upload session.

use bytes::Bytes;
use tracing::warn;

/// How a payload is split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub total_size: u64,
    pub chunk_size: usize,
    pub total_chunks: u32,
}

impl ChunkPlan {
    /// `ceil(total_size / chunk_size)` chunks; an empty payload still takes one.
    ///
    /// `None` when the payload needs more chunks than a `u32` index can
    /// address. `chunk_size` must be non-zero, which `BridgeConfig::validate`
    /// enforces.
    pub fn new(total_size: u64, chunk_size: usize) -> Option<Self> {
        let chunk = chunk_size.max(1) as u64;
        let total_chunks = u32::try_from(total_size.div_ceil(chunk).max(1)).ok()?;
        Some(Self {
            total_size,
            chunk_size,
            total_chunks,
        })
    }

    /// Byte range of chunk `index`. The last chunk may be short.
    pub fn range(&self, index: u32) -> std::ops::Range<usize> {
        let start = (index as usize).saturating_mul(self.chunk_size);
        let end = start.saturating_add(self.chunk_size).min(self.total_size as usize);
        start.min(end)..end
    }

    /// Zero-copy slice of chunk `index`.
    pub fn slice(&self, payload: &Bytes, index: u32) -> Bytes {
        payload.slice(self.range(index))
    }
}

/// Session state kept while chunks are in flight.
///
/// Created after `initChunkUpload` succeeds and dropped when the upload ends.
/// Dropping an unfinished session logs it as abandoned.
#[derive(Debug)]
pub struct ChunkSession {
    pub session_id: String,
    pub file_name: String,
    pub sub_dir: String,
    pub content_type: String,
    pub plan: ChunkPlan,
    next_expected_index: u32,
    completed: bool,
}

impl ChunkSession {
    pub fn new(
        session_id: impl Into<String>,
        file_name: impl Into<String>,
        sub_dir: impl Into<String>,
        content_type: impl Into<String>,
        plan: ChunkPlan,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            file_name: file_name.into(),
            sub_dir: sub_dir.into(),
            content_type: content_type.into(),
            plan,
            next_expected_index: 0,
            completed: false,
        }
    }

    /// Index of the next chunk to send, or `None` once all are acknowledged.
    pub fn next_index(&self) -> Option<u32> {
        (self.next_expected_index < self.plan.total_chunks).then_some(self.next_expected_index)
    }

    /// Record the acknowledgement of the chunk returned by `next_index`.
    pub fn acknowledge(&mut self) {
        self.next_expected_index = self.next_expected_index.saturating_add(1);
    }

    pub fn all_acknowledged(&self) -> bool {
        self.next_expected_index >= self.plan.total_chunks
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Drop for ChunkSession {
    fn drop(&mut self) {
        if !self.completed {
            warn!(
                session_id = %self.session_id,
                file_name = %self.file_name,
                acknowledged = self.next_expected_index,
                total_chunks = self.plan.total_chunks,
                "Chunk session abandoned"
            );
        }
    }
}
