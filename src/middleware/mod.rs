//! HTTP middleware wrapping every route.

pub mod metrics;
pub mod trace;

pub use metrics::{request_metrics, RecordRequest, SharedRecorder};
pub use trace::{trace_requests, ServerTracer};
