//! HTTP server setup and lifecycle.
//!
//! Configures the axum router with:
//! - Demo handlers (health, ping, user values, basic-auth admin)
//! - Static file serving under `/static`
//! - Server-span and request-metrics middleware on every route
//! - Graceful shutdown support

use std::net::SocketAddr;
use std::path::Path;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::middleware::{request_metrics, trace_requests, ServerTracer, SharedRecorder};
use crate::service::handlers::{get_user, health, ping, post_admin};
use crate::service::AppState;

/// Build the application router.
///
/// The trace layer is outermost so the metrics layer and the handler both run
/// inside the server span.
///
/// # Arguments
///
/// * `state` - Handler state (value store and accounts)
/// * `recorder` - Sink for per-request metrics
/// * `tracer` - Tracer for server spans
/// * `static_dir` - Directory served under `/static`
pub fn build_router(
    state: AppState,
    recorder: SharedRecorder,
    tracer: ServerTracer,
    static_dir: &Path,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/user/{name}", get(get_user))
        .route("/admin", post(post_admin))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn_with_state(recorder, request_metrics))
        .layer(middleware::from_fn_with_state(tracer, trace_requests))
        .with_state(state)
}

/// Bind to the configured address and serve `app` until shutdown.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `app` - Router from [`build_router`]
/// * `shutdown_rx` - Receiver for shutdown signal
pub async fn run_server(
    config: &Config,
    app: Router,
    shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, app, shutdown_rx).await
}

/// Serve `app` on an already bound listener.
///
/// Returns once the shutdown signal fires and in-flight requests drain.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    tracing::info!(address = %listener.local_addr()?, "Starting Tracewire HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Wait for shutdown signal
            let _ = shutdown_rx.changed().await;
            tracing::info!("Shutdown signal received, stopping server");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
