//! OpenTelemetry observability infrastructure.
//!
//! Provides:
//! - OTLP/gRPC export of traces and metrics over one shared collector channel
//! - Ordered bootstrap and aggregated, idempotent shutdown of the pipelines
//! - Structured logging with an optional OpenTelemetry bridge

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod resource;
pub mod traces;
pub mod tracing;

pub use endpoint::{parse_headers, CollectorEndpoint, SecurityMode};
pub use error::{PipelineFailure, ShutdownError, TelemetryError};
pub use lifecycle::{Pipeline, Providers, Telemetry, TelemetrySettings};
pub use metrics::RequestInstruments;
