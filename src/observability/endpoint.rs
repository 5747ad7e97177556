//! Collector endpoint and export header parsing.
//!
//! The collector endpoint is parsed once into a structured record. Its scheme
//! decides the transport security for the whole process:
//! - `https://host:port` selects TLS and attaches export headers
//! - `http://host:port` selects plaintext and never sends headers

use std::collections::HashMap;

use tonic::metadata::{MetadataKey, MetadataMap, MetadataValue};
use url::Url;

use super::error::TelemetryError;

/// Transport security negotiated from the endpoint scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    Insecure,
    Encrypted,
}

impl SecurityMode {
    fn scheme(self) -> &'static str {
        match self {
            SecurityMode::Insecure => "http",
            SecurityMode::Encrypted => "https",
        }
    }
}

/// A parsed OTLP/gRPC collector endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorEndpoint {
    pub security: SecurityMode,
    pub host: String,
    pub port: u16,
}

impl CollectorEndpoint {
    /// Parse an endpoint such as `https://collector:4317`.
    ///
    /// Anything other than an `http` or `https` URL with a host is a
    /// configuration error.
    pub fn parse(raw: &str) -> Result<Self, TelemetryError> {
        let url = Url::parse(raw.trim()).map_err(|e| {
            TelemetryError::Configuration(format!("invalid collector endpoint {raw:?}: {e}"))
        })?;

        let security = match url.scheme() {
            "https" => SecurityMode::Encrypted,
            "http" => SecurityMode::Insecure,
            other => {
                return Err(TelemetryError::Configuration(format!(
                    "collector endpoint {raw:?} has unsupported scheme {other:?} (expected http or https)"
                )))
            }
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                TelemetryError::Configuration(format!("collector endpoint {raw:?} has no host"))
            })?
            .to_string();

        let port = url.port_or_known_default().unwrap_or(match security {
            SecurityMode::Encrypted => 443,
            SecurityMode::Insecure => 80,
        });

        Ok(Self {
            security,
            host,
            port,
        })
    }

    /// The bare `host:port` target, without the scheme prefix.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The target as a URI tonic can dial.
    pub fn uri(&self) -> String {
        format!("{}://{}", self.security.scheme(), self.target())
    }
}

/// Parse the `OTEL_EXPORTER_OTLP_HEADERS` value.
///
/// Only a single `Key=Value` pair is honored. The string is split on the first
/// `=`, so further `=` characters belong to the value. Empty input, input
/// without `=`, and an empty key all yield an empty map.
pub fn parse_headers(raw: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    if let Some((key, value)) = raw.split_once('=') {
        if !key.is_empty() {
            headers.insert(key.to_string(), value.to_string());
        }
    }
    headers
}

/// Convert export headers into gRPC request metadata.
pub fn headers_to_metadata(
    headers: &HashMap<String, String>,
) -> Result<MetadataMap, TelemetryError> {
    let mut metadata = MetadataMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = MetadataKey::from_bytes(key.as_bytes()).map_err(|e| {
            TelemetryError::ExporterInit(format!("invalid export header name {key:?}: {e}"))
        })?;
        let value = MetadataValue::try_from(value.as_str()).map_err(|e| {
            TelemetryError::ExporterInit(format!("invalid value for export header {key:?}: {e}"))
        })?;
        metadata.insert(name, value);
    }
    Ok(metadata)
}
