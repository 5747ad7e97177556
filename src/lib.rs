//! Tracewire: OTLP telemetry bootstrap and request instrumentation for HTTP
//! services.
//!
//! Tracewire exports traces and metrics to an OpenTelemetry collector over a
//! single gRPC channel and tears both pipelines down in order on exit.
//!
//! # Architecture
//!
//! - **One channel**: Trace and metric exporters share one lazily dialed connection
//! - **Fail closed**: Nothing is installed globally unless every pipeline builds
//! - **Idempotent shutdown**: Every pipeline is flushed; failures are aggregated
//! - **Instrumented**: Each request gets a server span and latency metrics
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`middleware`]: Request metrics and server span layers
//! - [`observability`]: Telemetry bootstrap, shutdown and logging
//! - [`server`]: HTTP server setup
//! - [`service`]: Demo route handlers

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // observability::metrics::build_meter_provider is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc,      // Panic docs can be verbose
    clippy::too_many_lines           // Some functions are inherently long
)]

pub mod config;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod service;
