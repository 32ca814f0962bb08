//! Span pipeline: export layer → batch processor → exporter.
//!
//! ```text
//! tracing span closes
//!     → layer.rs (ids, parent, sampling, fields → SpanData)
//!     → processor.rs (bounded queue, batching worker)
//!     → exporter/ (console | otlp | zipkin | memory)
//! ```

pub mod context;
pub mod exporter;
pub mod layer;
pub mod processor;
pub mod sampler;
pub mod span;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::BatchConfig;

pub use context::{SpanContext, SpanId, TraceId, TRACEPARENT};
pub use exporter::{ExportError, SpanExporter};
pub use layer::ExportLayer;
pub use processor::{BatchSpanProcessor, ProcessorError};
pub use sampler::Sampler;
pub use span::{AttributeValue, Resource, SpanData, SpanKind, Status};

/// Owner of the export worker. Flushes and stops the pipeline.
pub struct TraceHandle {
    processor: BatchSpanProcessor,
    worker: JoinHandle<()>,
}

impl TraceHandle {
    /// Export every span closed so far.
    pub async fn force_flush(&self) -> Result<(), ProcessorError> {
        self.processor.force_flush().await
    }

    /// Spans lost to a full queue.
    pub fn dropped_spans(&self) -> u64 {
        self.processor.dropped_spans()
    }

    /// Flush pending spans, shut the exporter down and join the worker.
    pub async fn shutdown(self) -> Result<(), ProcessorError> {
        self.processor.shutdown().await?;
        self.worker.await.map_err(|_| ProcessorError::WorkerGone)
    }
}

/// Build the export layer and its handle without installing anything globally.
pub fn pipeline(
    exporter: Box<dyn SpanExporter>,
    sampler: Sampler,
    batch: &BatchConfig,
    runtime: &Handle,
) -> (ExportLayer, TraceHandle) {
    let (processor, worker) = BatchSpanProcessor::spawn(exporter, batch, runtime);
    let layer = ExportLayer::new(sampler, processor.clone());
    (layer, TraceHandle { processor, worker })
}
