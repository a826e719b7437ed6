//! File transfer to the host.

pub mod uploader;

pub use uploader::{chunk_count, BinaryChunkUploader, UploadRequest};
