//! Test utilities and collector harness for Tracewire tests.
//!
//! Provides:
//! - In-process fake OTLP/gRPC collector recording exported spans and metrics
//! - Request recorder double for the metrics middleware
//! - Response body helpers

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::response::Response;
use opentelemetry_proto::tonic::collector::metrics::v1::{
    metrics_service_server::{MetricsService, MetricsServiceServer},
    ExportMetricsServiceRequest, ExportMetricsServiceResponse,
};
use opentelemetry_proto::tonic::collector::trace::v1::{
    trace_service_server::{TraceService, TraceServiceServer},
    ExportTraceServiceRequest, ExportTraceServiceResponse,
};
use opentelemetry_proto::tonic::common::v1::{any_value, KeyValue};
use opentelemetry_proto::tonic::metrics::v1::{metric, number_data_point};
use opentelemetry_proto::tonic::trace::v1::Span;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response as GrpcResponse, Status};
use tracewire::middleware::RecordRequest;

/// A span as received by the collector, with its resource's service name.
#[derive(Debug, Clone)]
pub struct ReceivedSpan {
    pub service_name: Option<String>,
    pub span: Span,
}

impl ReceivedSpan {
    pub fn attribute(&self, key: &str) -> Option<&any_value::Value> {
        find_attribute(&self.span.attributes, key)
    }

    pub fn string_attribute(&self, key: &str) -> Option<String> {
        self.attribute(key).and_then(as_string)
    }

    pub fn int_attribute(&self, key: &str) -> Option<i64> {
        self.attribute(key).and_then(as_int)
    }

    pub fn trace_id_hex(&self) -> String {
        to_hex(&self.span.trace_id)
    }

    pub fn parent_span_id_hex(&self) -> String {
        to_hex(&self.span.parent_span_id)
    }
}

#[derive(Default)]
struct Received {
    spans: Vec<ReceivedSpan>,
    metric_exports: usize,
    /// Latest cumulative sum per counter name.
    sums: Vec<(String, i64)>,
    /// Latest cumulative sample count per histogram name.
    histogram_counts: Vec<(String, u64)>,
}

type Shared = Arc<Mutex<Received>>;

#[derive(Clone)]
struct TraceSink(Shared);

#[tonic::async_trait]
impl TraceService for TraceSink {
    async fn export(
        &self,
        request: Request<ExportTraceServiceRequest>,
    ) -> Result<GrpcResponse<ExportTraceServiceResponse>, Status> {
        let mut received = self.0.lock().unwrap();
        for resource_spans in request.into_inner().resource_spans {
            let service_name = resource_spans
                .resource
                .as_ref()
                .and_then(|r| find_attribute(&r.attributes, "service.name"))
                .and_then(as_string);
            for scope_spans in resource_spans.scope_spans {
                for span in scope_spans.spans {
                    received.spans.push(ReceivedSpan {
                        service_name: service_name.clone(),
                        span,
                    });
                }
            }
        }
        Ok(GrpcResponse::new(ExportTraceServiceResponse::default()))
    }
}

#[derive(Clone)]
struct MetricsSink(Shared);

#[tonic::async_trait]
impl MetricsService for MetricsSink {
    async fn export(
        &self,
        request: Request<ExportMetricsServiceRequest>,
    ) -> Result<GrpcResponse<ExportMetricsServiceResponse>, Status> {
        let mut received = self.0.lock().unwrap();
        received.metric_exports += 1;

        let metrics = request
            .into_inner()
            .resource_metrics
            .into_iter()
            .flat_map(|rm| rm.scope_metrics)
            .flat_map(|sm| sm.metrics);

        for metric in metrics {
            match metric.data {
                Some(metric::Data::Sum(sum)) => {
                    let total = sum
                        .data_points
                        .iter()
                        .filter_map(|dp| match dp.value {
                            Some(number_data_point::Value::AsInt(v)) => Some(v),
                            _ => None,
                        })
                        .sum();
                    received.sums.retain(|(name, _)| name != &metric.name);
                    received.sums.push((metric.name, total));
                }
                Some(metric::Data::Histogram(histogram)) => {
                    let count = histogram.data_points.iter().map(|dp| dp.count).sum();
                    received
                        .histogram_counts
                        .retain(|(name, _)| name != &metric.name);
                    received.histogram_counts.push((metric.name, count));
                }
                _ => {}
            }
        }
        Ok(GrpcResponse::new(ExportMetricsServiceResponse::default()))
    }
}

/// Fake OTLP collector listening on a random local port.
pub struct FakeCollector {
    pub addr: SocketAddr,
    received: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeCollector {
    /// Start the trace and metrics services on `127.0.0.1:0`.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind collector");
        let addr = listener.local_addr().expect("no local addr");

        let received = Shared::default();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let traces = TraceServiceServer::new(TraceSink(Arc::clone(&received)));
        let metrics = MetricsServiceServer::new(MetricsSink(Arc::clone(&received)));
        let router = tonic::transport::Server::builder()
            .add_service(traces)
            .add_service(metrics);

        let handle = tokio::spawn(async move {
            let incoming = TcpListenerStream::new(listener);
            let signal = async {
                let _ = shutdown_rx.await;
            };
            router
                .serve_with_incoming_shutdown(incoming, signal)
                .await
                .expect("collector failed");
        });

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Collector endpoint with the plaintext scheme.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn spans(&self) -> Vec<ReceivedSpan> {
        self.received.lock().unwrap().spans.clone()
    }

    pub fn span_named(&self, name: &str) -> Option<ReceivedSpan> {
        self.spans().into_iter().find(|s| s.span.name == name)
    }

    pub fn metric_exports(&self) -> usize {
        self.received.lock().unwrap().metric_exports
    }

    pub fn counter_total(&self, name: &str) -> Option<i64> {
        let received = self.received.lock().unwrap();
        received
            .sums
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn histogram_count(&self, name: &str) -> Option<u64> {
        let received = self.received.lock().unwrap();
        received
            .histogram_counts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Stop serving and wait for the server task to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FakeCollector {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Recorder double counting calls and keeping every latency sample.
#[derive(Default)]
pub struct CountingRecorder {
    calls: AtomicUsize,
    samples: Mutex<Vec<Duration>>,
}

impl CountingRecorder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn samples(&self) -> Vec<Duration> {
        self.samples.lock().unwrap().clone()
    }
}

impl RecordRequest for CountingRecorder {
    fn record_request(&self, elapsed: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.samples.lock().unwrap().push(elapsed);
    }
}

/// Collect a response body as UTF-8.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = body_string(response).await;
    serde_json::from_str(&body).expect("body is not JSON")
}

pub fn as_string(value: &any_value::Value) -> Option<String> {
    match value {
        any_value::Value::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}

pub fn as_int(value: &any_value::Value) -> Option<i64> {
    match value {
        any_value::Value::IntValue(v) => Some(*v),
        _ => None,
    }
}

fn find_attribute<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a any_value::Value> {
    attributes
        .iter()
        .find(|kv| kv.key == key)
        .and_then(|kv| kv.value.as_ref())
        .and_then(|v| v.value.as_ref())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Wait for a condition to become true with timeout.
///
/// # Arguments
///
/// * `timeout` - Maximum time to wait
/// * `condition` - Closure that returns true when condition is met
///
/// # Returns
///
/// `true` if condition was met, `false` if timeout expired
pub async fn wait_for<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
