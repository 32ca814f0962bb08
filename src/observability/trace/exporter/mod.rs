//! Span exporters.
//!
//! Exactly one exporter is active per process. The console exporter is the
//! default; OTLP and Zipkin ship spans to a collector when selected in the
//! configuration.

pub mod console;
pub mod memory;
pub mod otlp;
pub mod zipkin;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ExporterConfig;

use super::span::{Resource, SpanData};

pub use console::ConsoleExporter;
pub use memory::InMemoryExporter;
pub use otlp::OtlpExporter;
pub use zipkin::ZipkinExporter;

/// Error raised while exporting a batch.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write spans: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode spans: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("collector request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Destination for finished spans.
#[async_trait]
pub trait SpanExporter: Send + 'static {
    /// Export one batch. The batch is discarded whatever the outcome.
    async fn export(&mut self, batch: Vec<SpanData>) -> Result<(), ExportError>;

    /// Release resources. Called once, after the last export.
    async fn shutdown(&mut self) -> Result<(), ExportError> {
        Ok(())
    }
}

/// Build the exporter selected by `config`.
pub fn build_exporter(
    config: &ExporterConfig,
    resource: Resource,
    timeout: Duration,
) -> Result<Box<dyn SpanExporter>, ExportError> {
    let exporter: Box<dyn SpanExporter> = match config {
        ExporterConfig::Console { pretty } => Box::new(ConsoleExporter::stdout(resource, *pretty)),
        ExporterConfig::Otlp { endpoint } => {
            Box::new(OtlpExporter::new(endpoint.clone(), resource, timeout)?)
        }
        ExporterConfig::Zipkin { endpoint } => {
            Box::new(ZipkinExporter::new(endpoint.clone(), resource, timeout)?)
        }
    };
    Ok(exporter)
}

pub(crate) fn collector_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
}
