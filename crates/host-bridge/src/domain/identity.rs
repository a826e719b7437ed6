//! Local file descriptor and its content identity.

use bridge_types::DEFAULT_CONTENT_TYPE;
use bytes::Bytes;

/// A user-selected asset held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    /// Last-modified time, epoch milliseconds
    pub last_modified_ms: u64,
    pub content_type: String,
    pub bytes: Bytes,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, last_modified_ms: u64, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            last_modified_ms,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// `{name}_{size}_{last_modified_ms}`.
    ///
    /// Not a content hash: two different files with the same name, size and
    /// mtime share an identifier.
    pub fn identifier(&self) -> String {
        format!("{}_{}_{}", self.name, self.size(), self.last_modified_ms)
    }
}
