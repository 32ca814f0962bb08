//! Batch span processor.
//!
//! Closed spans are queued without blocking the thread that closed them.
//! A worker task drains the queue into the exporter in batches, on a timer
//! or whenever a batch fills up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::BatchConfig;

use super::exporter::SpanExporter;
use super::span::SpanData;

/// Errors reported by flush and shutdown.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("span processor worker has stopped")]
    WorkerGone,
}

enum Message {
    Span(SpanData),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Sending half of the pipeline. Cheap to clone.
#[derive(Clone)]
pub struct BatchSpanProcessor {
    tx: mpsc::Sender<Message>,
    dropped: Arc<AtomicU64>,
}

impl BatchSpanProcessor {
    /// Spawn the export worker on `runtime`.
    pub fn spawn(
        exporter: Box<dyn SpanExporter>,
        config: &BatchConfig,
        runtime: &Handle,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.max_queue_size.max(1));
        let worker = Worker {
            rx,
            exporter,
            batch: Vec::with_capacity(config.max_export_batch_size),
            max_batch: config.max_export_batch_size.max(1),
            delay: Duration::from_millis(config.scheduled_delay_ms.max(1)),
        };
        let handle = runtime.spawn(worker.run());

        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            handle,
        )
    }

    /// Queue a finished span. Drops it when the queue is full or closed.
    pub fn on_end(&self, span: SpanData) {
        if self.tx.try_send(Message::Span(span)).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of spans dropped so far.
    pub fn dropped_spans(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Export everything queued before this call.
    pub async fn force_flush(&self) -> Result<(), ProcessorError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Message::Flush(ack))
            .await
            .map_err(|_| ProcessorError::WorkerGone)?;
        done.await.map_err(|_| ProcessorError::WorkerGone)
    }

    /// Flush, shut the exporter down and stop the worker.
    pub async fn shutdown(&self) -> Result<(), ProcessorError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Message::Shutdown(ack))
            .await
            .map_err(|_| ProcessorError::WorkerGone)?;
        done.await.map_err(|_| ProcessorError::WorkerGone)
    }
}

struct Worker {
    rx: mpsc::Receiver<Message>,
    exporter: Box<dyn SpanExporter>,
    batch: Vec<SpanData>,
    max_batch: usize,
    delay: Duration,
}

impl Worker {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.delay);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                message = self.rx.recv() => match message {
                    Some(Message::Span(span)) => {
                        self.batch.push(span);
                        if self.batch.len() >= self.max_batch {
                            self.export().await;
                        }
                    }
                    Some(Message::Flush(ack)) => {
                        self.export().await;
                        let _ = ack.send(());
                    }
                    Some(Message::Shutdown(ack)) => {
                        self.finish().await;
                        let _ = ack.send(());
                        break;
                    }
                    None => {
                        self.finish().await;
                        break;
                    }
                },
                _ = ticker.tick() => self.export().await,
            }
        }
    }

    async fn export(&mut self) {
        while !self.batch.is_empty() {
            let take = self.batch.len().min(self.max_batch);
            let chunk: Vec<SpanData> = self.batch.drain(..take).collect();
            let count = chunk.len();
            if let Err(e) = self.exporter.export(chunk).await {
                tracing::warn!(error = %e, spans = count, "Span export failed, batch discarded");
            }
        }
    }

    async fn finish(&mut self) {
        // spans already queued behind the shutdown request still go out
        while let Ok(message) = self.rx.try_recv() {
            match message {
                Message::Span(span) => self.batch.push(span),
                Message::Flush(ack) | Message::Shutdown(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        self.export().await;
        if let Err(e) = self.exporter.shutdown().await {
            tracing::warn!(error = %e, "Span exporter shutdown failed");
        }
        self.rx.close();
    }
}
