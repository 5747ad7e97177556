//! Telemetry bootstrap and shutdown coordination.
//!
//! Bootstrap runs resource → connection → tracer pipeline → meter pipeline.
//! Both pipelines are fully built before either is installed, so a failure in
//! any step leaves nothing registered. Shutdown drains the registry in reverse
//! order and reports every failing pipeline.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::error::OTelSdkResult;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use tokio::time::Instant;

use super::connection::connect;
use super::endpoint::{headers_to_metadata, CollectorEndpoint, SecurityMode};
use super::error::{PipelineFailure, ShutdownError, TelemetryError};
use super::metrics::{build_meter_provider, install_meter_provider, service_scope};
use super::resource::build_resource;
use super::traces::{build_tracer_provider, install_tracer_provider};

/// Inputs to [`Telemetry::bootstrap`].
#[derive(Debug, Clone, Default)]
pub struct TelemetrySettings {
    /// Collector endpoint, `http://` or `https://`.
    pub endpoint: String,
    /// Export headers, attached only to encrypted exports.
    pub headers: HashMap<String, String>,
    pub service_name: Option<String>,
}

/// A registered telemetry pipeline that can be flushed and closed.
pub trait Pipeline: Send + 'static {
    fn name(&self) -> &'static str;

    /// Flush buffered data and release the exporter. Blocking.
    fn shutdown(&self) -> OTelSdkResult;
}

impl Pipeline for SdkTracerProvider {
    fn name(&self) -> &'static str {
        "traces"
    }

    fn shutdown(&self) -> OTelSdkResult {
        SdkTracerProvider::shutdown(self)
    }
}

impl Pipeline for SdkMeterProvider {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn shutdown(&self) -> OTelSdkResult {
        SdkMeterProvider::shutdown(self)
    }
}

/// Providers installed by a successful bootstrap.
///
/// Handed to components that emit telemetry instead of having them reach for
/// the global providers.
#[derive(Clone)]
pub struct Providers {
    pub tracer_provider: SdkTracerProvider,
    pub meter_provider: SdkMeterProvider,
}

impl Providers {
    pub fn tracer(&self, name: &str) -> SdkTracer {
        self.tracer_provider.tracer(name.to_string())
    }

    pub fn meter(&self, name: &str) -> Meter {
        self.meter_provider.meter_with_scope(service_scope(name))
    }
}

/// Process-scoped registry of telemetry pipelines.
///
/// Create one at startup, call [`bootstrap`](Self::bootstrap) once, and call
/// [`shutdown`](Self::shutdown) on the way out. Callers must not run two
/// shutdowns concurrently; a second sequential shutdown is a no-op.
#[derive(Default)]
pub struct Telemetry {
    pipelines: Mutex<Vec<Box<dyn Pipeline>>>,
}

impl Telemetry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and install the tracer and meter pipelines.
    ///
    /// Must be called from within a Tokio runtime. Bootstrapping again
    /// replaces the global providers; pipelines from earlier calls stay
    /// registered until [`shutdown`](Self::shutdown).
    pub fn bootstrap(&self, settings: &TelemetrySettings) -> Result<Providers, TelemetryError> {
        let resource = build_resource(settings.service_name.as_deref());

        let endpoint = CollectorEndpoint::parse(&settings.endpoint)?;
        let metadata = match endpoint.security {
            SecurityMode::Encrypted => Some(headers_to_metadata(&settings.headers)?),
            SecurityMode::Insecure => None,
        };
        let channel = connect(&endpoint)?;

        let tracer_provider =
            build_tracer_provider(resource.clone(), channel.clone(), metadata.clone())?;
        let meter_provider = build_meter_provider(resource, channel, metadata)?;

        install_tracer_provider(tracer_provider.clone());
        install_meter_provider(meter_provider.clone());

        self.register(Box::new(tracer_provider.clone()));
        self.register(Box::new(meter_provider.clone()));

        Ok(Providers {
            tracer_provider,
            meter_provider,
        })
    }

    /// Flush and close every registered pipeline.
    ///
    /// Pipelines run in reverse registration order on the blocking pool and
    /// share one deadline of `timeout`. A pipeline that misses it is reported
    /// as failed. The registry is emptied first, so calling this again returns
    /// `Ok(())` without doing any work.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ShutdownError> {
        let pipelines = std::mem::take(&mut *self.lock());
        if pipelines.is_empty() {
            return Ok(());
        }

        let deadline = Instant::now() + timeout;
        let mut failures = Vec::new();

        for pipeline in pipelines.into_iter().rev() {
            let name = pipeline.name();
            let task = tokio::task::spawn_blocking(move || pipeline.shutdown());

            let reason = match tokio::time::timeout_at(deadline, task).await {
                Ok(Ok(Ok(()))) => {
                    tracing::debug!(pipeline = name, "Telemetry pipeline shut down");
                    continue;
                }
                Ok(Ok(Err(e))) => e.to_string(),
                Ok(Err(e)) => format!("shutdown task failed: {e}"),
                Err(_) => format!("did not shut down within {timeout:?}"),
            };

            tracing::warn!(
                pipeline = name,
                error = %reason,
                "Telemetry pipeline shutdown failed"
            );
            failures.push(PipelineFailure {
                pipeline: name,
                reason,
            });
        }

        match ShutdownError::join(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Number of pipelines waiting to be shut down.
    pub fn pipeline_count(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn register(&self, pipeline: Box<dyn Pipeline>) {
        self.lock().push(pipeline);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Box<dyn Pipeline>>> {
        self.pipelines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
