//! Shared gRPC channel to the OTLP collector.
//!
//! One channel is built per bootstrap and handed to both exporters; tonic
//! channels are cheap handles over the same multiplexed HTTP/2 connection.

use std::time::Duration;

use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use super::endpoint::{CollectorEndpoint, SecurityMode};
use super::error::TelemetryError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a lazily-dialed channel to the collector.
///
/// Encrypted endpoints use the platform's native root certificates and the
/// endpoint host as the TLS server name. Dialing is deferred to the first
/// export, so an unreachable collector does not fail bootstrap.
///
/// Must be called from within a Tokio runtime.
pub fn connect(endpoint: &CollectorEndpoint) -> Result<Channel, TelemetryError> {
    let mut builder = Endpoint::from_shared(endpoint.uri())
        .map_err(|e| {
            TelemetryError::Connection(format!(
                "invalid collector target {}: {e}",
                endpoint.target()
            ))
        })?
        .connect_timeout(CONNECT_TIMEOUT);

    if endpoint.security == SecurityMode::Encrypted {
        let tls = ClientTlsConfig::new()
            .with_native_roots()
            .domain_name(endpoint.host.trim_matches(|c| c == '[' || c == ']'));
        builder = builder.tls_config(tls).map_err(|e| {
            TelemetryError::Connection(format!(
                "failed to configure TLS for {}: {e}",
                endpoint.target()
            ))
        })?;
    }

    Ok(builder.connect_lazy())
}
