//! Tracer pipeline: OTLP span exporter behind a batching processor.

use opentelemetry::global;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry_otlp::{SpanExporter, WithTonicConfig};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::trace::{BatchSpanProcessor, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tonic::metadata::MetadataMap;
use tonic::transport::Channel;

use super::error::TelemetryError;

/// Build a tracer provider exporting over `channel`.
///
/// Every trace is sampled. Buffering and flush cadence are left to the SDK's
/// batch processor defaults.
pub fn build_tracer_provider(
    resource: Resource,
    channel: Channel,
    metadata: Option<MetadataMap>,
) -> Result<SdkTracerProvider, TelemetryError> {
    let mut exporter = SpanExporter::builder().with_tonic().with_channel(channel);
    if let Some(metadata) = metadata {
        exporter = exporter.with_metadata(metadata);
    }
    let exporter = exporter.build()?;

    let processor = BatchSpanProcessor::builder(exporter).build();

    Ok(SdkTracerProvider::builder()
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(resource)
        .with_span_processor(processor)
        .build())
}

/// Make `provider` the process-wide tracer provider and install the
/// W3C trace-context + baggage propagator.
pub fn install_tracer_provider(provider: SdkTracerProvider) {
    global::set_tracer_provider(provider);
    global::set_text_map_propagator(composite_propagator());
}

fn composite_propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}
