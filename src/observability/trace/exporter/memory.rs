//! In-memory exporter, mainly for tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::{ExportError, SpanExporter};
use crate::observability::trace::span::SpanData;

/// Keeps every exported span. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct InMemoryExporter {
    spans: Arc<Mutex<Vec<SpanData>>>,
}

impl InMemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything exported so far.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reset(&self) {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl SpanExporter for InMemoryExporter {
    async fn export(&mut self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch);
        Ok(())
    }
}
