//! Resource descriptor attached to every span and metric from this process.

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;

/// Build the process resource.
///
/// Starts from the SDK defaults (which include environment detectors), so a
/// missing service name falls back to `unknown_service` rather than an empty
/// string.
pub fn build_resource(service_name: Option<&str>) -> Resource {
    let mut builder = Resource::builder()
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")));

    if let Some(name) = service_name.filter(|n| !n.is_empty()) {
        builder = builder.with_service_name(name.to_string());
    }

    builder.build()
}
