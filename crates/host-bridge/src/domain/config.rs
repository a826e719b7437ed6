//! Bridge configuration with validation.
//!
//! Defaults match the host shell's own limits: 1 MiB chunks, 10 s per chunk
//! acknowledgement, 30 s for a whole prepared file.

use crate::ports::outbound::KVStoreError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Directories created by `initializeDirectories` when the caller passes none.
pub const DEFAULT_DIRECTORIES: [&str; 5] = [
    "assets/panoramas",
    "assets/hotspots",
    "assets/sounds",
    "assets/thumbnails",
    "db",
];

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Chunking and acknowledgement limits
    pub upload: UploadConfig,
    /// Simulated host behaviour
    pub simulator: SimulatorConfig,
    /// Directory layout requested at startup
    pub directories: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            upload: UploadConfig::default(),
            simulator: SimulatorConfig::default(),
            directories: DEFAULT_DIRECTORIES.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl BridgeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.chunk_size == 0 {
            return Err(ConfigError::InvalidLimit("chunk_size cannot be 0".into()));
        }

        if self.upload.chunk_ack_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "chunk_ack_timeout cannot be 0".into(),
            ));
        }

        if self.upload.file_ack_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "file_ack_timeout cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Defaults overridden from the environment, then validated.
    ///
    /// # Environment Variables
    ///
    /// - `PANO_CHUNK_SIZE`: chunk size in bytes
    /// - `PANO_CHUNK_ACK_TIMEOUT_MS`: per-chunk acknowledgement timeout
    /// - `PANO_FILE_ACK_TIMEOUT_MS`: prepared-file acknowledgement timeout
    /// - `PANO_SIM_RESPONSE_DELAY_MS`: simulated completion latency
    /// - `PANO_SIM_ACK_DELAY_MS`: simulated side-channel latency
    /// - `PANO_SIM_STORE_PATH`: file backing the simulated host (in-memory if unset)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = env_number("PANO_CHUNK_SIZE")? {
            config.upload.chunk_size = size as usize;
        }
        if let Some(ms) = env_number("PANO_CHUNK_ACK_TIMEOUT_MS")? {
            config.upload.chunk_ack_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_number("PANO_FILE_ACK_TIMEOUT_MS")? {
            config.upload.file_ack_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_number("PANO_SIM_RESPONSE_DELAY_MS")? {
            config.simulator.response_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_number("PANO_SIM_ACK_DELAY_MS")? {
            config.simulator.ack_delay = Duration::from_millis(ms);
        }
        if let Ok(path) = env::var("PANO_SIM_STORE_PATH") {
            if !path.is_empty() {
                config.simulator.store_path = Some(PathBuf::from(path));
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_number(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    /// Payloads above this size go through a chunk session
    pub chunk_size: usize,
    /// How long to wait for each `chunkSaved`
    #[serde(with = "humantime_serde")]
    pub chunk_ack_timeout: Duration,
    /// How long to wait for `fileSaved` after `uploadFileBinary`
    #[serde(with = "humantime_serde")]
    pub file_ack_timeout: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024 * 1024,
            chunk_ack_timeout: Duration::from_secs(10),
            file_ack_timeout: Duration::from_secs(30),
        }
    }
}

/// Simulated host configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Delay before a completion is delivered
    #[serde(with = "humantime_serde")]
    pub response_delay: Duration,
    /// Delay before a `chunkSaved`/`fileSaved` event is published
    #[serde(with = "humantime_serde")]
    pub ack_delay: Duration,
    /// Backing file; `None` keeps everything in memory
    pub store_path: Option<PathBuf>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_millis(100),
            ack_delay: Duration::from_millis(300),
            store_path: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Simulator store unavailable: {0}")]
    Store(#[from] KVStoreError),
}
