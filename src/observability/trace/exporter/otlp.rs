//! OTLP/HTTP exporter using the JSON protobuf mapping.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{collector_client, ExportError, SpanExporter};
use crate::observability::trace::span::{unix_nanos, AttributeValue, Resource, SpanData, Status};

const SCOPE_NAME: &str = env!("CARGO_PKG_NAME");

/// Posts batches to an OTLP collector, e.g. `http://localhost:4318/v1/traces`.
pub struct OtlpExporter {
    client: reqwest::Client,
    endpoint: String,
    resource: Resource,
}

impl OtlpExporter {
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
impl SpanExporter for OtlpExporter {
    async fn export(&mut self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        let body = encode_request(&self.resource, &batch);
        self.client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        tracing::trace!(spans = batch.len(), endpoint = %self.endpoint, "Exported spans over OTLP");
        Ok(())
    }
}

/// Build an `ExportTraceServiceRequest` document.
pub fn encode_request(resource: &Resource, spans: &[SpanData]) -> Value {
    json!({
        "resourceSpans": [{
            "resource": {
                "attributes": [key_value("service.name", &AttributeValue::String(resource.service_name.clone()))],
            },
            "scopeSpans": [{
                "scope": { "name": SCOPE_NAME, "version": env!("CARGO_PKG_VERSION") },
                "spans": spans.iter().map(encode_span).collect::<Vec<_>>(),
            }],
        }],
    })
}

fn encode_span(span: &SpanData) -> Value {
    let mut value = json!({
        "traceId": span.context.trace_id.to_hex(),
        "spanId": span.context.span_id.to_hex(),
        "name": span.name,
        "kind": span.kind.otlp_code(),
        // 64-bit integers are strings in the JSON mapping
        "startTimeUnixNano": unix_nanos(span.start_time).to_string(),
        "endTimeUnixNano": span.end_time.map(unix_nanos).unwrap_or_default().to_string(),
        "attributes": span
            .attributes
            .iter()
            .map(|(key, value)| key_value(key, value))
            .collect::<Vec<_>>(),
        "status": { "code": span.status.otlp_code() },
    });
    if let Some(parent) = span.parent_span_id {
        value["parentSpanId"] = Value::String(parent.to_hex());
    }
    if let Status::Error { message } = &span.status {
        value["status"]["message"] = Value::String(message.clone());
    }
    value
}

fn key_value(key: &str, value: &AttributeValue) -> Value {
    let value = match value {
        AttributeValue::String(v) => json!({ "stringValue": v }),
        AttributeValue::Bool(v) => json!({ "boolValue": v }),
        AttributeValue::I64(v) => json!({ "intValue": v.to_string() }),
        AttributeValue::F64(v) => json!({ "doubleValue": v }),
    };
    json!({ "key": key, "value": value })
}
