//! Server-side span hooks for `tower_http::trace::TraceLayer`.
//!
//! `make_span` opens one server span per request, continuing the caller's
//! trace when a valid `traceparent` header is present. `on_response`
//! records the status code and maps it to a span status.

use std::time::Duration;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use tracing::field::Empty;
use tracing::Span;

use crate::observability::trace::TRACEPARENT;

/// Build the server span for `request`.
pub fn make_span(request: &Request<Body>) -> Span {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str);
    let path = request.uri().path();
    let header = |name: &str| request.headers().get(name).and_then(|v| v.to_str().ok());
    let name = format!("{} {}", request.method(), route.unwrap_or(path));

    tracing::info_span!(
        "http.server",
        otel.name = name.as_str(),
        otel.kind = "server",
        http.request.method = %request.method(),
        http.route = route,
        url.path = path,
        request_id = header("x-request-id"),
        traceparent = header(TRACEPARENT),
        http.response.status_code = Empty,
        otel.status_code = Empty,
        error.message = Empty,
    )
}

/// Record the response status on the server span.
pub fn on_response(response: &Response<Body>, latency: Duration, span: &Span) {
    let status = response.status().as_u16();
    span.record("http.response.status_code", status);
    span.record("otel.status_code", status_code(status));

    tracing::debug!(
        parent: span,
        status,
        latency_ms = latency.as_millis() as u64,
        "Request completed"
    );
}

/// Server span status: 5xx and out-of-range codes are errors.
fn status_code(status: u16) -> &'static str {
    if !(100..600).contains(&status) || status >= 500 {
        "error"
    } else {
        "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_code(200), "ok");
        assert_eq!(status_code(404), "ok");
        assert_eq!(status_code(500), "error");
        assert_eq!(status_code(503), "error");
        assert_eq!(status_code(99), "error");
        assert_eq!(status_code(600), "error");
    }
}
