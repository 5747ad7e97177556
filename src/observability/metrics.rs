//! Meter pipeline and the request instruments recorded by the HTTP layer.
//!
//! Key metrics:
//! - http.server.request_total: Counter of handled requests
//! - http.server.response_time: Histogram of response latency in milliseconds

use std::time::Duration;

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{global, InstrumentationScope};
use opentelemetry_otlp::{MetricExporter, WithTonicConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::Resource;
use tonic::metadata::MetadataMap;
use tonic::transport::Channel;

use super::error::TelemetryError;

/// Interval at which the periodic reader collects and exports.
pub const EXPORT_INTERVAL: Duration = Duration::from_secs(3);

/// Build a meter provider exporting over `channel` every [`EXPORT_INTERVAL`].
pub fn build_meter_provider(
    resource: Resource,
    channel: Channel,
    metadata: Option<MetadataMap>,
) -> Result<SdkMeterProvider, TelemetryError> {
    let mut exporter = MetricExporter::builder().with_tonic().with_channel(channel);
    if let Some(metadata) = metadata {
        exporter = exporter.with_metadata(metadata);
    }
    let exporter = exporter.build()?;

    let reader = PeriodicReader::builder(exporter)
        .with_interval(EXPORT_INTERVAL)
        .build();

    Ok(SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build())
}

/// Make `provider` the process-wide meter provider.
pub fn install_meter_provider(provider: SdkMeterProvider) {
    global::set_meter_provider(provider);
}

/// Instrumentation scope carrying the crate version.
pub(crate) fn service_scope(name: &str) -> InstrumentationScope {
    InstrumentationScope::builder(name.to_string())
        .with_version(env!("CARGO_PKG_VERSION"))
        .build()
}

/// Meter from the global provider, scoped to the service.
///
/// Falls back to the no-op provider when telemetry was never bootstrapped.
pub fn service_meter(service_name: &str) -> Meter {
    global::meter_with_scope(service_scope(service_name))
}

/// Long-lived request instruments shared by every in-flight request.
///
/// The SDK instruments aggregate lock-free, so concurrent callers need no
/// extra synchronization.
#[derive(Clone)]
pub struct RequestInstruments {
    /// Total number of handled requests.
    pub request_total: Counter<u64>,
    /// Response latency in milliseconds.
    pub response_time: Histogram<u64>,
}

impl RequestInstruments {
    /// Create the request instruments from a meter.
    pub fn new(meter: &Meter) -> Self {
        Self {
            request_total: meter
                .u64_counter("http.server.request_total")
                .with_description("Total number of requests received by the server")
                .with_unit("1")
                .build(),
            response_time: meter
                .u64_histogram("http.server.response_time")
                .with_description("Distribution of server response times")
                .with_unit("ms")
                .build(),
        }
    }

    /// Count one request and record its latency.
    pub fn record(&self, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.request_total.add(1, &[]);
        self.response_time.record(millis, &[]);
    }
}
