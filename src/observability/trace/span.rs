//! Finished span records handed to exporters.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::context::{SpanContext, SpanId};

/// Role of a span in a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanKind {
    Internal,
    Server,
    Client,
}

impl SpanKind {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "internal" => Some(SpanKind::Internal),
            "server" => Some(SpanKind::Server),
            "client" => Some(SpanKind::Client),
            _ => None,
        }
    }

    /// Numeric value used by the OTLP protocol.
    pub fn otlp_code(self) -> u8 {
        match self {
            SpanKind::Internal => 1,
            SpanKind::Server => 2,
            SpanKind::Client => 3,
        }
    }
}

/// Outcome of the operation a span covers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Unset,
    Ok,
    Error { message: String },
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error { .. })
    }

    /// Numeric value used by the OTLP protocol.
    pub fn otlp_code(&self) -> u8 {
        match self {
            Status::Unset => 0,
            Status::Ok => 1,
            Status::Error { .. } => 2,
        }
    }
}

/// A recorded field value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Bool(bool),
    I64(i64),
    F64(f64),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::String(v) => f.write_str(v),
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::I64(v) => write!(f, "{v}"),
            AttributeValue::F64(v) => write!(f, "{v}"),
        }
    }
}

/// Everything known about one span.
#[derive(Clone, Debug)]
pub struct SpanData {
    pub context: SpanContext,
    pub parent_span_id: Option<SpanId>,
    pub name: String,
    pub kind: SpanKind,
    /// `tracing` target of the callsite that opened the span.
    pub target: String,
    pub start_time: SystemTime,
    /// Set when the span closes.
    pub end_time: Option<SystemTime>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub status: Status,
}

impl SpanData {
    /// Time between start and end, zero while the span is still open.
    pub fn duration(&self) -> Duration {
        self.end_time
            .and_then(|end| end.duration_since(self.start_time).ok())
            .unwrap_or_default()
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Attributes describing the process that produced the spans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub service_name: String,
}

impl Resource {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

pub(crate) fn unix_nanos(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

pub(crate) fn unix_micros(time: SystemTime) -> u128 {
    unix_nanos(time) / 1_000
}
