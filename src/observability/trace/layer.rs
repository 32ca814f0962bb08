//! `tracing-subscriber` layer that turns `tracing` spans into exportable spans.
//!
//! Field conventions understood by the layer:
//!
//! | field                     | effect                                        |
//! |---------------------------|-----------------------------------------------|
//! | `otel.name`               | overrides the exported span name              |
//! | `otel.kind`               | `server`, `client` or `internal`              |
//! | `otel.status_code`        | `ok` or `error`                               |
//! | `otel.status_description` | error description                             |
//! | `error.message`           | error description, also kept as an attribute  |
//! | `traceparent`             | remote parent, only read when the span opens  |
//!
//! Every other field becomes an attribute.

use std::fmt;
use std::time::SystemTime;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::context::{SpanContext, SpanId, TraceId, TRACEPARENT};
use super::processor::BatchSpanProcessor;
use super::sampler::Sampler;
use super::span::{AttributeValue, SpanData, SpanKind, Status};

const OTEL_NAME: &str = "otel.name";
const OTEL_KIND: &str = "otel.kind";
const OTEL_STATUS_CODE: &str = "otel.status_code";
const OTEL_STATUS_DESCRIPTION: &str = "otel.status_description";
const ERROR_MESSAGE: &str = "error.message";

/// Records span timing and fields, then hands closed spans to the processor.
pub struct ExportLayer {
    sampler: Sampler,
    processor: BatchSpanProcessor,
}

impl ExportLayer {
    pub fn new(sampler: Sampler, processor: BatchSpanProcessor) -> Self {
        Self { sampler, processor }
    }
}

impl<S> Layer<S> for ExportLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut fields = FieldCollector::default();
        attrs.record(&mut fields);

        let remote_parent = fields
            .take(TRACEPARENT)
            .as_ref()
            .and_then(AttributeValue::as_str)
            .and_then(SpanContext::from_traceparent);
        let parent = remote_parent.or_else(|| {
            let parent = span.parent()?;
            let extensions = parent.extensions();
            let context = extensions.get::<SpanData>().map(|data| data.context);
            context
        });

        let trace_id = parent.map_or_else(TraceId::random, |p| p.trace_id);
        let sampled = self.sampler.should_sample(parent.as_ref(), trace_id);
        let metadata = attrs.metadata();

        let mut data = SpanData {
            context: SpanContext {
                trace_id,
                span_id: SpanId::random(),
                sampled,
                remote: false,
            },
            parent_span_id: parent.map(|p| p.span_id),
            name: metadata.name().to_string(),
            kind: SpanKind::Internal,
            target: metadata.target().to_string(),
            start_time: SystemTime::now(),
            end_time: None,
            attributes: Default::default(),
            status: Status::Unset,
        };
        fields.apply(&mut data);

        span.extensions_mut().insert(data);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = FieldCollector::default();
        values.record(&mut fields);
        // the parent is fixed once the span exists
        fields.take(TRACEPARENT);

        let mut extensions = span.extensions_mut();
        if let Some(data) = extensions.get_mut::<SpanData>() {
            fields.apply(data);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(mut data) = span.extensions_mut().remove::<SpanData>() else {
            return;
        };
        if !data.context.sampled {
            return;
        }
        data.end_time = Some(SystemTime::now());
        self.processor.on_end(data);
    }
}

#[derive(Default)]
struct FieldCollector {
    fields: Vec<(&'static str, AttributeValue)>,
}

impl FieldCollector {
    fn take(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.fields.iter().position(|(key, _)| *key == name)?;
        Some(self.fields.remove(index).1)
    }

    fn apply(self, data: &mut SpanData) {
        for (key, value) in self.fields {
            match key {
                OTEL_NAME => data.name = value.to_string(),
                OTEL_KIND => {
                    if let Some(kind) = value.as_str().and_then(SpanKind::parse) {
                        data.kind = kind;
                    }
                }
                OTEL_STATUS_CODE => {
                    data.status = match value.to_string().to_ascii_lowercase().as_str() {
                        "ok" => Status::Ok,
                        "error" => Status::Error {
                            message: error_message(data),
                        },
                        _ => Status::Unset,
                    };
                }
                OTEL_STATUS_DESCRIPTION => set_error_message(data, value.to_string()),
                ERROR_MESSAGE => {
                    set_error_message(data, value.to_string());
                    data.attributes.insert(key.to_string(), value);
                }
                _ => {
                    data.attributes.insert(key.to_string(), value);
                }
            }
        }
    }
}

fn error_message(data: &SpanData) -> String {
    match &data.status {
        Status::Error { message } => message.clone(),
        _ => data
            .attributes
            .get(ERROR_MESSAGE)
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}

fn set_error_message(data: &mut SpanData, message: String) {
    if let Status::Error { message: current } = &mut data.status {
        *current = message;
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.push((field.name(), AttributeValue::F64(value)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push((field.name(), AttributeValue::I64(value)));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        let value = i64::try_from(value)
            .map(AttributeValue::I64)
            .unwrap_or_else(|_| AttributeValue::String(value.to_string()));
        self.fields.push((field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.push((field.name(), AttributeValue::Bool(value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .push((field.name(), AttributeValue::String(value.to_string())));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .push((field.name(), AttributeValue::String(format!("{value:?}"))));
    }
}
