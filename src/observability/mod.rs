//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → trace/ (spans: server span per request, client span per outbound call)
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Span exporter (console by default, OTLP/Zipkin when configured)
//!     → stderr log lines
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - One explicit [`init`] at process start, returning a [`TelemetryHandle`]
//! - Instrumentation is attached explicitly: `TraceLayer` hooks on the server,
//!   `TracedClient` on outbound calls
//! - Logs and spans share one subscriber, so log lines carry span context

pub mod logging;
pub mod metrics;
pub mod trace;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::TelemetryConfig;
use trace::exporter::build_exporter;
use trace::{ExportError, ExportLayer, ProcessorError, Resource, Sampler, TraceHandle};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors from the tracing bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry is already initialized for this process")]
    AlreadyInitialized,

    #[error("telemetry must be initialized inside a Tokio runtime")]
    NoRuntime,

    #[error("failed to build span exporter: {0}")]
    Exporter(#[from] ExportError),

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] TryInitError),

    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Handle to the installed pipeline. Shut it down before the process exits
/// so queued spans are exported.
pub struct TelemetryHandle {
    trace: TraceHandle,
}

impl TelemetryHandle {
    /// Export every span closed so far.
    pub async fn force_flush(&self) -> Result<(), TelemetryError> {
        Ok(self.trace.force_flush().await?)
    }

    /// Flush and stop the export worker.
    pub async fn shutdown(self) -> Result<(), TelemetryError> {
        let dropped = self.trace.dropped_spans();
        if dropped > 0 {
            tracing::warn!(dropped, "Spans dropped because the export queue was full");
        }
        self.trace.shutdown().await?;
        Ok(())
    }
}

/// Install the process-wide tracing pipeline.
///
/// Call once, from inside the Tokio runtime, before serving traffic.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryHandle, TelemetryError> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(TelemetryError::AlreadyInitialized);
    }
    let installed = install(config);
    if installed.is_err() {
        INSTALLED.store(false, Ordering::SeqCst);
    }
    installed
}

fn install(config: &TelemetryConfig) -> Result<TelemetryHandle, TelemetryError> {
    let runtime = Handle::try_current().map_err(|_| TelemetryError::NoRuntime)?;

    let resource = Resource::new(&config.service_name);
    let exporter = build_exporter(
        &config.exporter,
        resource,
        Duration::from_secs(config.batch.export_timeout_secs),
    )?;
    let (export_layer, trace) = trace::pipeline(
        exporter,
        Sampler::from(&config.sampler),
        &config.batch,
        &runtime,
    );

    subscriber(&config.log_level, export_layer).try_init()?;

    tracing::info!(
        service_name = %config.service_name,
        exporter = ?config.exporter,
        sampler = ?config.sampler,
        "Tracing initialized"
    );

    Ok(TelemetryHandle { trace })
}

/// The process subscriber. Every span reaches the export layer; `log_level`
/// only filters what is printed.
fn subscriber(
    log_level: &str,
    export_layer: ExportLayer,
) -> impl Subscriber + for<'a> LookupSpan<'a> + Send + Sync {
    tracing_subscriber::registry()
        .with(export_layer)
        .with(logging::layer(log_level))
}
