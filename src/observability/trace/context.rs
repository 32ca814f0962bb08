//! Trace and span identifiers, and W3C Trace Context propagation.

use std::fmt;

use rand::Rng;
use tracing::Span;
use tracing_subscriber::registry::{LookupSpan, Registry};

use super::span::SpanData;

/// Header carrying the W3C trace context.
pub const TRACEPARENT: &str = "traceparent";

const SUPPORTED_VERSION: &str = "00";
const FLAG_SAMPLED: u8 = 0x01;

/// 128-bit trace identifier. Never zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let id: u128 = rng.gen();
            if id != 0 {
                return Self(id);
            }
        }
    }

    pub fn from_u128(id: u128) -> Option<Self> {
        (id != 0).then_some(Self(id))
    }

    pub fn to_u128(self) -> u128 {
        self.0
    }

    /// Lowercase, zero-padded 32-character hex form.
    pub fn to_hex(self) -> String {
        format!("{:032x}", self.0)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 32 || !is_lower_hex(hex) {
            return None;
        }
        u128::from_str_radix(hex, 16).ok().and_then(Self::from_u128)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({:032x})", self.0)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// 64-bit span identifier. Never zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let id: u64 = rng.gen();
            if id != 0 {
                return Self(id);
            }
        }
    }

    pub fn from_u64(id: u64) -> Option<Self> {
        (id != 0).then_some(Self(id))
    }

    /// Lowercase, zero-padded 16-character hex form.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 16 || !is_lower_hex(hex) {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().and_then(Self::from_u64)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpanId({:016x})", self.0)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// The propagated part of a span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanContext {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub sampled: bool,
    /// True when the context was extracted from an incoming request.
    pub remote: bool,
}

impl SpanContext {
    /// Format as a `traceparent` header value.
    pub fn to_traceparent(&self) -> String {
        let flags = if self.sampled { FLAG_SAMPLED } else { 0 };
        format!(
            "{}-{}-{}-{:02x}",
            SUPPORTED_VERSION,
            self.trace_id.to_hex(),
            self.span_id.to_hex(),
            flags
        )
    }

    /// Parse a `traceparent` header value. The result is marked remote.
    ///
    /// Unknown future versions are accepted as long as the first four
    /// fields are well formed; version `ff` is always invalid.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        if version.len() != 2 || !is_lower_hex(version) || version == "ff" {
            return None;
        }
        if version == SUPPORTED_VERSION && parts.next().is_some() {
            return None;
        }
        if flags.len() != 2 || !is_lower_hex(flags) {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;

        Some(Self {
            trace_id: TraceId::from_hex(trace_id)?,
            span_id: SpanId::from_hex(span_id)?,
            sampled: flags & FLAG_SAMPLED == FLAG_SAMPLED,
            remote: true,
        })
    }

    /// Context of `span`, if it is tracked by the export layer.
    ///
    /// Returns `None` when the span is disabled or the active subscriber
    /// is not built on a [`Registry`].
    pub fn of(span: &Span) -> Option<Self> {
        span.with_subscriber(|(id, dispatch)| {
            let registry = dispatch.downcast_ref::<Registry>()?;
            let span = registry.span(id)?;
            let extensions = span.extensions();
            let context = extensions.get::<SpanData>().map(|data| data.context);
            context
        })
        .flatten()
    }

    /// Context of the current span.
    pub fn current() -> Option<Self> {
        Self::of(&Span::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn test_parse_valid_traceparent() {
        let ctx = SpanContext::from_traceparent(VALID).unwrap();
        assert_eq!(ctx.trace_id.to_hex(), "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(ctx.span_id.to_hex(), "00f067aa0ba902b7");
        assert!(ctx.sampled);
        assert!(ctx.remote);
        assert_eq!(ctx.to_traceparent(), VALID);
    }

    #[test]
    fn test_unsampled_flag() {
        let ctx = SpanContext::from_traceparent(
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00",
        )
        .unwrap();
        assert!(!ctx.sampled);
    }

    #[test]
    fn test_rejects_malformed_traceparent() {
        let cases = [
            "",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7",
            "00-00000000000000000000000000000000-00f067aa0ba902b7-01",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-0000000000000000-01",
            "00-4BF92F3577B34DA6A3CE929D0E0E4736-00f067aa0ba902b7-01",
            "ff-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
            "00-4bf92f3577b34da6a3ce929d0e0e473-00f067aa0ba902b7-01",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01-extra",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-zz",
        ];
        for case in cases {
            assert!(SpanContext::from_traceparent(case).is_none(), "{case}");
        }
    }

    #[test]
    fn test_future_version_may_carry_extra_fields() {
        let ctx = SpanContext::from_traceparent(
            "01-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01-whatever",
        );
        assert!(ctx.is_some());
    }

    #[test]
    fn test_random_ids_are_nonzero_and_padded() {
        for _ in 0..32 {
            let trace = TraceId::random();
            let span = SpanId::random();
            assert_ne!(trace.to_u128(), 0);
            assert_eq!(trace.to_hex().len(), 32);
            assert_eq!(span.to_hex().len(), 16);
        }
    }

    #[test]
    fn test_no_context_without_layer() {
        assert!(SpanContext::current().is_none());
    }
}
