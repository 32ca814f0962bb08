//! Outbound HTTP client with tracing attached.
//!
//! Every call runs inside a client span that is a child of the current
//! span. The span's context is injected as a `traceparent` header so the
//! downstream service can continue the trace.

use reqwest::header::HeaderValue;
use reqwest::{Request, RequestBuilder, Response};
use tracing::field::Empty;
use tracing::Instrument;
use url::Url;

use crate::observability::trace::{SpanContext, TRACEPARENT};

/// Thin wrapper over [`reqwest::Client`] that instruments [`execute`](Self::execute).
#[derive(Clone, Debug, Default)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Start a GET request. Send it with [`execute`](Self::execute).
    pub fn get(&self, url: Url) -> RequestBuilder {
        self.inner.get(url)
    }

    /// Send `request` inside a client span.
    pub async fn execute(&self, mut request: Request) -> reqwest::Result<Response> {
        let span = tracing::info_span!(
            "http.client",
            otel.name = %request.method(),
            otel.kind = "client",
            http.request.method = %request.method(),
            url.full = %request.url(),
            server.address = request.url().host_str().unwrap_or_default(),
            server.port = request.url().port_or_known_default(),
            http.response.status_code = Empty,
            otel.status_code = Empty,
            error.message = Empty,
        );

        if let Some(context) = SpanContext::of(&span) {
            if let Ok(value) = HeaderValue::from_str(&context.to_traceparent()) {
                request.headers_mut().insert(TRACEPARENT, value);
            }
        }

        let result = self.inner.execute(request).instrument(span.clone()).await;
        match &result {
            Ok(response) => {
                let status = response.status();
                span.record("http.response.status_code", status.as_u16());
                if status.is_client_error() || status.is_server_error() {
                    span.record("otel.status_code", "error");
                }
                tracing::debug!(parent: &span, status = status.as_u16(), "Downstream responded");
            }
            Err(e) => {
                span.record("error.message", tracing::field::display(e));
                span.record("otel.status_code", "error");
            }
        }
        result
    }
}
