//! # Bridge Telemetry
//!
//! Installs the global `tracing` subscriber used by the bridge crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_logging, TelemetryConfig};
//!
//! init_logging(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PANO_SERVICE_NAME` | `pano-bridge` | Service name in the startup line |
//! | `PANO_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directive |
//! | `PANO_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `PANO_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;

pub use config::TelemetryConfig;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set, which callers running
/// several tests in one process may ignore.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match (config.console_output, config.json_logs) {
        (false, _) => registry.try_init(),
        (true, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        (true, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(true),
            )
            .try_init(),
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Install a test-friendly subscriber writing through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
