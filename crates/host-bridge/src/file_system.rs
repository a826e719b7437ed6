//! File-system facade for the editor's service layer.
//!
//! Every operation here is terminal: failures are logged and turned into
//! `false`, `None`, a caller-supplied default or the input path, so callers
//! never handle bridge errors.

use crate::cache::FileIdentityCache;
use crate::domain::identity::LocalFile;
use crate::service::HostBridge;
use crate::upload::{BinaryChunkUploader, UploadRequest};
use bridge_types::{
    CreateThumbnailParams, DeleteFileParams, GetFileUrlParams, HostMethod,
    InitializeDirectoriesParams, ReadJsonFileParams, SaveJsonFileParams,
};
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Default thumbnail edge in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

/// Prefixes of paths that are already URLs.
const URL_PREFIXES: [&str; 3] = ["http", "blob:", "data:"];

pub struct HostFileSystem {
    bridge: Arc<HostBridge>,
    uploader: BinaryChunkUploader,
    cache: FileIdentityCache,
}

impl HostFileSystem {
    pub fn new(bridge: Arc<HostBridge>) -> Self {
        Self {
            uploader: BinaryChunkUploader::new(bridge.clone()),
            cache: FileIdentityCache::new(bridge.clone()),
            bridge,
        }
    }

    pub fn bridge(&self) -> &Arc<HostBridge> {
        &self.bridge
    }

    /// Ask the host to create the configured directory layout.
    pub async fn initialize_directories(&self) -> bool {
        let params = InitializeDirectoriesParams {
            dirs: self.bridge.config().directories.clone(),
        };
        match self.bridge.call(HostMethod::InitializeDirectories, &params).await {
            Ok(result) => result == Value::Bool(true),
            Err(e) => {
                error!(error = %e, "Failed to initialize directories");
                false
            }
        }
    }

    pub async fn save_json_file(&self, file_name: &str, data: &Value) -> bool {
        let params = SaveJsonFileParams {
            file_name: file_name.to_string(),
            data: data.clone(),
        };
        match self.bridge.call(HostMethod::SaveJsonFile, &params).await {
            Ok(result) => result == Value::Bool(true),
            Err(e) => {
                error!(file_name, error = %e, "Failed to save JSON file");
                false
            }
        }
    }

    /// Read a JSON document, or `default` when the host has nothing usable.
    ///
    /// `null`, `false`, `0` and `""` count as nothing; empty arrays and
    /// objects are returned as-is.
    pub async fn read_json_file(&self, file_name: &str, default: Value) -> Value {
        let params = ReadJsonFileParams {
            file_name: file_name.to_string(),
        };
        match self.bridge.call(HostMethod::ReadJsonFile, &params).await {
            Ok(result) if is_truthy(&result) => result,
            Ok(_) => default,
            Err(e) => {
                error!(file_name, error = %e, "Failed to read JSON file");
                default
            }
        }
    }

    /// Store a file in one shot, binary or base64 depending on the host.
    pub async fn save_file(&self, file: &LocalFile, sub_dir: &str, rename: Option<&str>) -> Option<String> {
        let request = UploadRequest::from_file(file, sub_dir, rename);
        match self.uploader.save(&request).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(file_name = %request.file_name, error = %e, "Failed to save file");
                None
            }
        }
    }

    /// Store a file, in chunks when it exceeds the configured chunk size.
    pub async fn save_file_large(&self, file: &LocalFile, sub_dir: &str, rename: Option<&str>) -> Option<String> {
        let request = UploadRequest::from_file(file, sub_dir, rename);
        match self.uploader.save_large(&request).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(file_name = %request.file_name, error = %e, "Large file upload failed");
                None
            }
        }
    }

    /// Reuse the host's copy of an identical file, or upload and register it.
    pub async fn save_file_with_cache(
        &self,
        file: &LocalFile,
        sub_dir: &str,
        rename: Option<&str>,
    ) -> Option<String> {
        self.cache
            .ensure_uploaded(file, sub_dir, || {
                self.save_file_large(file, sub_dir, rename).boxed()
            })
            .await
    }

    /// Remove a stored file or JSON document. An empty path is a no-op.
    pub async fn delete_file(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let params = DeleteFileParams {
            path: path.to_string(),
        };
        match self.bridge.call(HostMethod::DeleteFile, &params).await {
            Ok(result) => result == Value::Bool(true),
            Err(e) => {
                error!(path, error = %e, "Failed to delete file");
                false
            }
        }
    }

    /// Thumbnail path for an image, or the image itself if none was made.
    pub async fn create_thumbnail(&self, image_path: &str, width: Option<u32>, height: Option<u32>) -> String {
        let params = CreateThumbnailParams {
            image_path: image_path.to_string(),
            width: width.unwrap_or(DEFAULT_THUMBNAIL_SIZE),
            height: height.unwrap_or(DEFAULT_THUMBNAIL_SIZE),
        };
        match self.bridge.call(HostMethod::CreateThumbnail, &params).await {
            Ok(Value::String(path)) if !path.is_empty() => {
                debug!(image_path, thumbnail = %path, "Thumbnail created");
                path
            }
            Ok(_) => {
                info!(image_path, "Host made no thumbnail; using source image");
                image_path.to_string()
            }
            Err(e) => {
                error!(image_path, error = %e, "Failed to create thumbnail");
                image_path.to_string()
            }
        }
    }

    /// Displayable URL for a stored path.
    ///
    /// Paths that are already URLs pass through untouched; anything the host
    /// cannot resolve comes back as the path itself.
    pub async fn get_file_url(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if URL_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
            return path.to_string();
        }

        let params = GetFileUrlParams {
            path: path.to_string(),
        };
        match self.bridge.call(HostMethod::GetFileUrl, &params).await {
            Ok(Value::String(url)) if !url.is_empty() => url,
            Ok(_) => path.to_string(),
            Err(e) => {
                error!(path, error = %e, "Failed to resolve file URL");
                path.to_string()
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
