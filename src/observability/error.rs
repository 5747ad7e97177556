//! Error types for telemetry bootstrap and shutdown.

use std::fmt;

/// Errors raised while bootstrapping or tearing down the telemetry pipelines.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Malformed collector endpoint or header configuration.
    #[error("telemetry configuration: {0}")]
    Configuration(String),

    /// Transport credentials or the collector channel could not be built.
    #[error("collector connection: {0}")]
    Connection(String),

    /// An OTLP exporter rejected the channel or the export headers.
    #[error("exporter initialization: {0}")]
    ExporterInit(String),

    /// One or more pipelines failed to shut down.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

impl From<opentelemetry_otlp::ExporterBuildError> for TelemetryError {
    fn from(err: opentelemetry_otlp::ExporterBuildError) -> Self {
        Self::ExporterInit(err.to_string())
    }
}

/// A single pipeline that did not shut down cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFailure {
    /// Name of the pipeline (`traces`, `metrics`, ...).
    pub pipeline: &'static str,
    /// Reason reported by the SDK or the coordinator.
    pub reason: String,
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pipeline, self.reason)
    }
}

/// Every pipeline failure observed during one shutdown, in the order the
/// pipelines were drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownError {
    failures: Vec<PipelineFailure>,
}

impl ShutdownError {
    /// Join the collected failures; `None` when every pipeline succeeded.
    pub fn join(failures: Vec<PipelineFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn failures(&self) -> &[PipelineFailure] {
        &self.failures
    }
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "telemetry shutdown failed for {} pipeline(s)",
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ShutdownError {}
