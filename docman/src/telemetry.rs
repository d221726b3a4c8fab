//! Structured logging setup.
//!
//! The core crates only emit `tracing` events; this module installs a
//! subscriber for processes that host them.

use std::env;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directive, e.g. `info` or `docman_core=debug,warn`.
    pub log_level: String,

    /// Emit one JSON object per event instead of human-readable lines.
    pub json_logs: bool,

    /// Include span enter/exit events.
    pub log_spans: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            log_spans: false,
        }
    }
}

impl TelemetryConfig {
    /// Reads configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `DOCMAN_LOG_LEVEL` or `RUST_LOG`: filter directive (default: info)
    /// - `DOCMAN_JSON_LOGS`: `true`/`1` for JSON output (default: false)
    /// - `DOCMAN_LOG_SPANS`: `true`/`1` to log span lifecycles (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            log_level: env::var("DOCMAN_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: env_flag("DOCMAN_JSON_LOGS").unwrap_or(defaults.json_logs),
            log_spans: env_flag("DOCMAN_LOG_SPANS").unwrap_or(defaults.log_spans),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Installs the global tracing subscriber described by `config`.
///
/// # Errors
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|err| TelemetryError::InvalidFilter(err.to_string()))?;

    let span_events = if config.log_spans {
        fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE
    } else {
        fmt::format::FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_logs {
        registry
            .with(fmt::layer().json().with_span_events(span_events))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_span_events(span_events))
            .try_init()
    };

    installed.map_err(|err| TelemetryError::AlreadyInstalled(err.to_string()))?;

    tracing::debug!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Tracing initialized"
    );

    Ok(())
}
