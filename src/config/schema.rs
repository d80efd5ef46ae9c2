//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the adapter.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an absent file means "run with defaults".

use serde::{Deserialize, Serialize};

/// Port the adapter listens on when neither the command line nor the config
/// file names an address.
pub const DEFAULT_ADAPTER_PORT: &str = "38355";

/// Root configuration for the telemetry adapter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdapterConfig {
    /// Listener configuration (address, limits, draining).
    pub listener: ListenerConfig,

    /// Downstream stream processor settings.
    pub downstream: DownstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Listen address: `host:port`, `:port` or a bare port.
    pub address: String,

    /// Time allowed for in-flight requests to finish on graceful stop.
    pub drain_timeout_secs: u64,

    /// Per-request timeout applied to the telemetry endpoints.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Stop gracefully on SIGINT/SIGTERM.
    pub handle_signals: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADAPTER_PORT.to_string(),
            drain_timeout_secs: 10,
            request_timeout_secs: 30,
            max_body_bytes: 4 * 1024 * 1024,
            handle_signals: true,
        }
    }
}

/// Downstream stream processor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Endpoint receiving forwarded telemetry batches.
    pub url: String,

    /// Timeout for a single downstream request in seconds. All attempts of a
    /// batch, plus backoff, must finish within `listener.request_timeout_secs`.
    pub request_timeout_secs: u64,

    /// Total attempts per batch, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9091/telemetry".to_string(),
            request_timeout_secs: 5,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable single-line output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level directive (trace, debug, info, warn, error or a full filter).
    /// `RUST_LOG` takes precedence when set.
    pub log_level: String,

    /// Output format of log lines.
    pub log_format: LogFormat,

    /// Prometheus exporter bind address; no exporter when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_address: None,
        }
    }
}
