//! Request metrics middleware.
//!
//! Runs the rest of the stack to completion, then counts the request and
//! records its latency. Recording happens for every request, whatever the
//! status code.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::observability::RequestInstruments;

/// Sink for per-request measurements.
///
/// Implementations are shared by every in-flight request and must accept
/// concurrent calls without external locking.
pub trait RecordRequest: Send + Sync + 'static {
    fn record_request(&self, elapsed: Duration);
}

impl RecordRequest for RequestInstruments {
    fn record_request(&self, elapsed: Duration) {
        self.record(elapsed);
    }
}

pub type SharedRecorder = Arc<dyn RecordRequest>;

pub async fn request_metrics(
    State(recorder): State<SharedRecorder>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let response = next.run(request).await;

    recorder.record_request(start.elapsed());

    response
}
