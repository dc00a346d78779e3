//! # Vellum Telemetry
//!
//! Structured logging setup shared by every binary and the integration test
//! suite. Plain or JSON `tracing` output with an env-driven filter; exporters
//! for hosted observability stacks would layer on top of the same subscriber.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VL_LOG_LEVEL` or `RUST_LOG` | `info` | Log level filter |
//! | `VL_JSON_LOGS` | `false` (auto `true` in containers) | JSON log lines |
//! | `VL_SERVICE_NAME` | `vellum` | Service name stamped on every line |

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Telemetry initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Logging configuration, environment-driven.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name stamped on every log line.
    pub service_name: String,
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "vellum".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Reads configuration from the environment.
    ///
    /// JSON output defaults on inside containers, where a log collector is
    /// assumed to be reading stdout.
    #[must_use]
    pub fn from_env() -> Self {
        let is_container = std::env::var("KUBERNETES_SERVICE_HOST").is_ok()
            || std::env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: std::env::var("VL_SERVICE_NAME")
                .unwrap_or_else(|_| "vellum".to_string()),
            log_level: std::env::var("VL_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),
            json_logs: std::env::var("VL_JSON_LOGS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// `TelemetryError::Init` when a subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let builder = fmt()
        .with_env_filter(config.env_filter())
        .with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}

/// Best-effort subscriber install for tests; repeat calls are no-ops.
pub fn init_for_tests() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "vellum");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_bad_filter_falls_back() {
        let config = TelemetryConfig {
            log_level: ":::not a filter:::".to_string(),
            ..TelemetryConfig::default()
        };
        // Must not panic; falls back to info.
        let _ = config.env_filter();
    }

    #[test]
    fn test_repeat_test_init_is_harmless() {
        init_for_tests();
        init_for_tests();
    }
}
