//! Content-identity cache.
//!
//! Before uploading, ask the host whether a file with the same identity was
//! stored already and reuse its path. After a fresh upload, register the new
//! path under the identity. The host owns the records; this side only queries
//! and registers.

use crate::domain::error::BridgeError;
use crate::domain::identity::LocalFile;
use crate::service::HostBridge;
use bridge_types::{CheckFileExistsParams, HostMethod, RegisterFileCacheParams};
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Query/register front end for the host's identity records.
pub struct FileIdentityCache {
    bridge: Arc<HostBridge>,
}

impl FileIdentityCache {
    pub fn new(bridge: Arc<HostBridge>) -> Self {
        Self { bridge }
    }

    /// Path previously registered for `identifier`, if any.
    pub async fn lookup(&self, identifier: &str, sub_dir: &str) -> Result<Option<String>, BridgeError> {
        let params = CheckFileExistsParams {
            identifier: identifier.to_string(),
            sub_dir: sub_dir.to_string(),
        };
        let result = self.bridge.call(HostMethod::CheckFileExists, &params).await?;
        Ok(match result {
            Value::String(path) if !path.is_empty() => Some(path),
            _ => None,
        })
    }

    /// Record `path` as the stored copy of `identifier`.
    pub async fn register(&self, path: &str, identifier: &str) -> Result<bool, BridgeError> {
        let params = RegisterFileCacheParams {
            path: path.to_string(),
            identifier: identifier.to_string(),
        };
        let result = self.bridge.call(HostMethod::RegisterFileCache, &params).await?;
        Ok(result == Value::Bool(true))
    }

    /// Return the cached path for `file`, or upload it with `save_fn` and
    /// register the result.
    ///
    /// A failed lookup falls through to a fresh upload. A failed
    /// registration is logged and the uploaded path is still returned.
    pub async fn ensure_uploaded<'a>(
        &self,
        file: &LocalFile,
        sub_dir: &str,
        save_fn: impl FnOnce() -> BoxFuture<'a, Option<String>>,
    ) -> Option<String> {
        let identifier = file.identifier();

        match self.lookup(&identifier, sub_dir).await {
            Ok(Some(path)) => {
                info!(identifier = %identifier, path = %path, "Reusing cached upload");
                return Some(path);
            }
            Ok(None) => debug!(identifier = %identifier, "No cached upload"),
            Err(e) => warn!(identifier = %identifier, error = %e, "Cache lookup failed; uploading"),
        }

        let path = save_fn().await?;

        match self.register(&path, &identifier).await {
            Ok(true) => debug!(identifier = %identifier, path = %path, "Upload registered in cache"),
            Ok(false) => warn!(identifier = %identifier, path = %path, "Host declined cache registration"),
            Err(e) => warn!(identifier = %identifier, error = %e, "Cache registration failed"),
        }

        Some(path)
    }
}
