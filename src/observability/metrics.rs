//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_server_requests_total` (counter): requests by method, route, status
//! - `http_server_request_duration_seconds` (histogram): latency distribution
//! - `downstream_calls_total` (counter): outbound calls by outcome
//!
//! Updates are no-ops until [`install`] registers the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::MetricsConfig;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("invalid metrics address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("failed to install Prometheus exporter: {0}")]
    Install(#[from] metrics_exporter_prometheus::BuildError),
}

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn install(config: &MetricsConfig) -> Result<(), MetricsError> {
    let addr: SocketAddr = config.bind_address.parse()?;
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one served request.
pub fn record_request(method: &str, route: &str, status: u16, latency: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_server_requests_total", &labels).increment(1);
    metrics::histogram!("http_server_request_duration_seconds", &labels)
        .record(latency.as_secs_f64());
}

/// Record one downstream call by outcome (`ok`, `request`, `status`, `body`, `decode`).
pub fn record_downstream(outcome: &'static str) {
    metrics::counter!("downstream_calls_total", "outcome" => outcome).increment(1);
}
