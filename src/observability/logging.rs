//! Structured logging.
//!
//! # Responsibilities
//! - Build the log filter from config and `RUST_LOG`
//! - Provide the log formatting layer
//! - Keep the filter scoped to log output
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Logs go to stderr; stdout belongs to the console span exporter

use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Filter from `RUST_LOG`, falling back to `level` for this crate and tower-http.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(level).into())
}

fn default_directives(level: &str) -> String {
    format!("hello_trace={level},ping_backend={level},tower_http={level}")
}

/// Compact human-readable log lines on stderr.
pub fn fmt_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
}

/// The log output with its filter attached.
///
/// The filter is per-layer so it only decides what gets printed. Span
/// creation for the export layer is unaffected by the log level.
pub fn layer<S>(level: &str) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    fmt_layer::<S>().with_filter(env_filter(level))
}
