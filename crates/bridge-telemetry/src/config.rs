//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `host_bridge=debug,info`
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "pano-bridge".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PANO_SERVICE_NAME`: Service name (default: pano-bridge)
    /// - `PANO_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `PANO_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `PANO_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("PANO_SERVICE_NAME")
                .unwrap_or_else(|_| "pano-bridge".to_string()),

            log_level: env::var("PANO_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("PANO_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("PANO_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(false),
        }
    }
}

/// Interpret common truthy/falsy spellings, falling back to `default`.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
