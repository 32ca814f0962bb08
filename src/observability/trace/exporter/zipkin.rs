//! Zipkin v2 JSON exporter.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{collector_client, ExportError, SpanExporter};
use crate::observability::trace::span::{unix_micros, Resource, SpanData, SpanKind, Status};

/// Posts batches to a Zipkin collector, e.g. `http://localhost:9411/api/v2/spans`.
pub struct ZipkinExporter {
    client: reqwest::Client,
    endpoint: String,
    resource: Resource,
}

impl ZipkinExporter {
    pub fn new(
        endpoint: impl Into<String>,
        resource: Resource,
        timeout: Duration,
    ) -> Result<Self, ExportError> {
        Ok(Self {
            client: collector_client(timeout)?,
            endpoint: endpoint.into(),
            resource,
        })
    }
}

#[async_trait]
impl SpanExporter for ZipkinExporter {
    async fn export(&mut self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        let spans = encode_spans(&self.resource, &batch);
        self.client
            .post(&self.endpoint)
            .json(&spans)
            .send()
            .await?
            .error_for_status()?;
        tracing::trace!(spans = batch.len(), endpoint = %self.endpoint, "Exported spans to Zipkin");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipkinSpan<'a> {
    trace_id: String,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<SpanKind>,
    timestamp: u128,
    duration: u128,
    local_endpoint: LocalEndpoint<'a>,
    tags: BTreeMap<&'a str, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocalEndpoint<'a> {
    service_name: &'a str,
}

/// Map spans onto the Zipkin v2 model.
pub fn encode_spans<'a>(resource: &'a Resource, spans: &'a [SpanData]) -> Vec<ZipkinSpan<'a>> {
    spans
        .iter()
        .map(|span| {
            let mut tags: BTreeMap<&str, String> = span
                .attributes
                .iter()
                .map(|(key, value)| (key.as_str(), value.to_string()))
                .collect();
            if let Status::Error { message } = &span.status {
                tags.insert("error", message.clone());
            }

            ZipkinSpan {
                trace_id: span.context.trace_id.to_hex(),
                id: span.context.span_id.to_hex(),
                parent_id: span.parent_span_id.map(|id| id.to_hex()),
                name: &span.name,
                kind: match span.kind {
                    SpanKind::Internal => None,
                    kind => Some(kind),
                },
                timestamp: unix_micros(span.start_time),
                // zipkin treats 0 as "unknown"
                duration: span.duration().as_micros().max(1),
                local_endpoint: LocalEndpoint {
                    service_name: &resource.service_name,
                },
                tags,
            }
        })
        .collect()
}
