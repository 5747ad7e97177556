//! Tracewire: an HTTP service exporting traces and metrics over OTLP/gRPC.
//!
//! # Usage
//!
//! ```bash
//! tracewire --port 8080 --otel-endpoint http://localhost:4317 --service-name demo
//! ```
//!
//! Environment variables can also be used:
//! - `PORT`: Port to listen on
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint (`http://` or `https://`)
//! - `OTEL_EXPORTER_OTLP_HEADERS`: One `Key=Value` export header
//! - `OTEL_SERVICE_NAME`: Service name on all telemetry
//! - `RUST_LOG`: Log filter (overrides `--log-level`)

use std::sync::Arc;

use tokio::sync::watch;
use tracewire::config::{Config, FailurePolicy};
use tracewire::middleware::{ServerTracer, SharedRecorder};
use tracewire::observability::metrics::service_meter;
use tracewire::observability::tracing::init_tracing;
use tracewire::observability::{RequestInstruments, Telemetry};
use tracewire::server::{build_router, run_server};
use tracewire::service::{Accounts, AppState};

/// Print startup banner with version and configuration.
fn print_banner(config: &Config, telemetry_enabled: bool) {
    let version = env!("CARGO_PKG_VERSION");
    let endpoint = match (&config.otel_endpoint, telemetry_enabled) {
        (Some(endpoint), true) => endpoint.as_str(),
        _ => "disabled",
    };
    eprintln!(
        r#"
   _____                              _
  |_   _| __ __ _  ___ _____      _(_)_ __ ___
    | || '__/ _` |/ __/ _ \ \ /\ / / | '__/ _ \
    | || | | (_| | (_|  __/\ V  V /| | | |  __/
    |_||_|  \__,_|\___\___| \_/\_/ |_|_|  \___|

  Tracewire v{} - OTLP-instrumented HTTP service

  Configuration:
    Address:    {}:{}
    Service:    {}
    Telemetry:  {}
    Static Dir: {}
    Log Level:  {}

  Press Ctrl+C to shutdown gracefully.
"#,
        version,
        config.host,
        config.port,
        config.scope_name(),
        endpoint,
        config.static_dir.display(),
        config.log_level
    );
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let sigterm = async {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            () = ctrl_c => {
                tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
            }
            () = sigterm => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        tracing::info!("Received Ctrl+C, initiating shutdown...");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();
    let scope = config.scope_name().to_string();

    // Bootstrap telemetry before the log subscriber so spans can be bridged
    let telemetry = Telemetry::new();
    let bootstrap = config
        .telemetry_settings()
        .and_then(|settings| telemetry.bootstrap(&settings));
    let (providers, bootstrap_error) = match bootstrap {
        Ok(providers) => (Some(providers), None),
        Err(e) => (None, Some(e)),
    };

    // Initialize tracing/logging
    init_tracing(
        &config.log_level,
        config.log_format,
        providers.as_ref().map(|p| p.tracer(&scope)),
    );

    match bootstrap_error {
        None => tracing::info!(
            pipelines = telemetry.pipeline_count(),
            "Telemetry pipelines installed"
        ),
        Some(e) if config.on_telemetry_failure == FailurePolicy::Abort => {
            tracing::error!(error = %e, "Telemetry bootstrap failed, aborting");
            return Err(e.into());
        }
        Some(e) => {
            tracing::warn!(
                error = %e,
                "Telemetry bootstrap failed, continuing without telemetry"
            );
        }
    }

    print_banner(&config, providers.is_some());

    // Without providers the global meter and tracer are no-ops
    let (meter, tracer) = match &providers {
        Some(providers) => (
            providers.meter(&scope),
            ServerTracer::new(providers.tracer(&scope)),
        ),
        None => (service_meter(&scope), ServerTracer::global(&scope)),
    };
    let recorder: SharedRecorder = Arc::new(RequestInstruments::new(&meter));

    let app = build_router(
        AppState::new(Accounts::default()),
        recorder,
        tracer,
        &config.static_dir,
    );

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // Run the server
    let served = run_server(&config, app, shutdown_rx).await;

    // Flush telemetry even when the server failed
    if let Err(e) = telemetry.shutdown(config.shutdown_timeout()).await {
        tracing::error!(error = %e, "Telemetry shutdown reported failures");
    }

    served?;
    tracing::info!("Tracewire shutdown complete");
    Ok(())
}
