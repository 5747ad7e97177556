//! Configuration parsing for the Tracewire server.
//!
//! Supports:
//! - CLI arguments via clap
//! - Standard OpenTelemetry environment variables
//! - Sensible defaults for quick start

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::observability::{parse_headers, TelemetryError, TelemetrySettings};

/// Tracewire: an HTTP service instrumented with OTLP traces and metrics.
#[derive(Parser, Debug, Clone)]
#[command(name = "tracewire")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "TRACEWIRE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// OpenTelemetry collector endpoint (http:// or https://)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,

    /// Export header as a single Key=Value pair (sent only over https)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_HEADERS", default_value = "")]
    pub otel_headers: String,

    /// Service name attached to all telemetry
    #[arg(long, env = "OTEL_SERVICE_NAME")]
    pub service_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TRACEWIRE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(
        long,
        env = "TRACEWIRE_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    /// What to do when telemetry cannot be bootstrapped
    #[arg(
        long,
        env = "TRACEWIRE_ON_TELEMETRY_FAILURE",
        value_enum,
        default_value_t = FailurePolicy::Continue
    )]
    pub on_telemetry_failure: FailurePolicy,

    /// Seconds allowed for flushing telemetry on shutdown
    #[arg(long, env = "TRACEWIRE_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Directory served under /static
    #[arg(long, env = "TRACEWIRE_STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,
}

/// Console log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Policy applied when telemetry bootstrap fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Log the failure and serve without telemetry.
    Continue,
    /// Exit with the bootstrap error.
    Abort,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Telemetry bootstrap inputs derived from this configuration.
    ///
    /// A missing collector endpoint is a configuration error, handled by the
    /// caller like any other bootstrap failure.
    pub fn telemetry_settings(&self) -> Result<TelemetrySettings, TelemetryError> {
        let endpoint = self.otel_endpoint.clone().ok_or_else(|| {
            TelemetryError::Configuration("OTEL_EXPORTER_OTLP_ENDPOINT is not set".to_string())
        })?;

        Ok(TelemetrySettings {
            endpoint,
            headers: parse_headers(&self.otel_headers),
            service_name: self.service_name.clone().filter(|s| !s.is_empty()),
        })
    }

    /// Name used for the tracer and meter scopes.
    pub fn scope_name(&self) -> &str {
        self.service_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(env!("CARGO_PKG_NAME"))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Create a default configuration for testing.
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0, // Random port
            otel_endpoint: Some("http://127.0.0.1:4317".into()),
            otel_headers: String::new(),
            service_name: Some("tracewire-test".into()),
            log_level: "debug".into(),
            log_format: LogFormat::Text,
            on_telemetry_failure: FailurePolicy::Continue,
            shutdown_timeout_secs: 1,
            static_dir: PathBuf::from("./static"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            otel_endpoint: None,
            otel_headers: String::new(),
            service_name: None,
            log_level: "info".into(),
            log_format: LogFormat::Text,
            on_telemetry_failure: FailurePolicy::Continue,
            shutdown_timeout_secs: 5,
            static_dir: PathBuf::from("./static"),
        }
    }
}
