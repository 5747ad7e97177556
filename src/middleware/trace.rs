//! Server span middleware.
//!
//! Continues the caller's trace from the W3C `traceparent`/`baggage` request
//! headers and wraps the request in a `SERVER` span.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::{FutureExt, SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};

/// Tracer used to start server spans.
#[derive(Clone)]
pub struct ServerTracer {
    tracer: Arc<BoxedTracer>,
}

impl ServerTracer {
    /// Use a specific tracer, typically from [`Providers`](crate::observability::Providers).
    pub fn new<T>(tracer: T) -> Self
    where
        T: Tracer + Send + Sync + 'static,
        T::Span: Send + Sync + 'static,
    {
        Self {
            tracer: Arc::new(BoxedTracer::new(Box::new(tracer))),
        }
    }

    /// Use the global tracer provider. No-op until telemetry is bootstrapped.
    pub fn global(name: &str) -> Self {
        Self {
            tracer: Arc::new(global::tracer(name.to_string())),
        }
    }
}

pub async fn trace_requests(
    State(server): State<ServerTracer>,
    request: Request,
    next: Next,
) -> Response {
    let parent_cx = extract_context(request.headers());

    let method = request.method().as_str().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned());

    let name = match &route {
        Some(route) => format!("{method} {route}"),
        None => method.clone(),
    };

    let mut attributes = vec![
        KeyValue::new("http.request.method", method),
        KeyValue::new("url.path", request.uri().path().to_owned()),
    ];
    if let Some(route) = route {
        attributes.push(KeyValue::new("http.route", route));
    }

    let span = server
        .tracer
        .span_builder(name)
        .with_kind(SpanKind::Server)
        .with_attributes(attributes)
        .start_with_context(&*server.tracer, &parent_cx);
    let cx = parent_cx.with_span(span);

    let response = next.run(request).with_context(cx.clone()).await;

    let status = response.status();
    let span = cx.span();
    span.set_attribute(KeyValue::new(
        "http.response.status_code",
        i64::from(status.as_u16()),
    ));
    if status.is_server_error() {
        span.set_status(Status::error(status.to_string()));
    }
    span.end();

    response
}

/// Parent context from the inbound headers via the global propagator.
fn extract_context(headers: &HeaderMap) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

/// Extractor for reading propagation fields from HTTP headers.
struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
