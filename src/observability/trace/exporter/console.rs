//! Console exporter: one JSON document per span.

use std::collections::BTreeMap;
use std::io::{self, Write};

use async_trait::async_trait;
use serde::Serialize;

use super::{ExportError, SpanExporter};
use crate::observability::trace::span::{
    unix_micros, AttributeValue, Resource, SpanData, SpanKind, Status,
};

/// Writes spans to a writer, stdout by default.
pub struct ConsoleExporter<W = io::Stdout> {
    writer: W,
    resource: Resource,
    pretty: bool,
}

impl ConsoleExporter<io::Stdout> {
    pub fn stdout(resource: Resource, pretty: bool) -> Self {
        Self::with_writer(io::stdout(), resource, pretty)
    }
}

impl<W: Write + Send + 'static> ConsoleExporter<W> {
    pub fn with_writer(writer: W, resource: Resource, pretty: bool) -> Self {
        Self {
            writer,
            resource,
            pretty,
        }
    }

    fn write_span(&mut self, span: &SpanData) -> Result<(), ExportError> {
        let record = ConsoleSpan::new(&self.resource, span);
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &record)?;
        } else {
            serde_json::to_writer(&mut self.writer, &record)?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send + 'static> SpanExporter for ConsoleExporter<W> {
    async fn export(&mut self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        for span in &batch {
            self.write_span(span)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConsoleSpan<'a> {
    resource: ConsoleResource<'a>,
    trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    name: &'a str,
    id: String,
    kind: SpanKind,
    timestamp: u128,
    duration: u128,
    attributes: &'a BTreeMap<String, AttributeValue>,
    status: &'a Status,
}

#[derive(Serialize)]
struct ConsoleResource<'a> {
    attributes: BTreeMap<&'static str, &'a str>,
}

impl<'a> ConsoleSpan<'a> {
    fn new(resource: &'a Resource, span: &'a SpanData) -> Self {
        Self {
            resource: ConsoleResource {
                attributes: BTreeMap::from([("service.name", resource.service_name.as_str())]),
            },
            trace_id: span.context.trace_id.to_hex(),
            parent_id: span.parent_span_id.map(|id| id.to_hex()),
            name: &span.name,
            id: span.context.span_id.to_hex(),
            kind: span.kind,
            timestamp: unix_micros(span.start_time),
            duration: span.duration().as_micros(),
            attributes: &span.attributes,
            status: &span.status,
        }
    }
}
