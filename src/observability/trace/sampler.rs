//! Sampling decisions for new spans.

use crate::config::SamplerConfig;

use super::context::{SpanContext, TraceId};

/// Decides whether a span is recorded and exported.
#[derive(Clone, Debug, PartialEq)]
pub enum Sampler {
    AlwaysOn,
    AlwaysOff,
    /// Sample traces whose id falls under `ratio` of the id space.
    TraceIdRatio(f64),
    /// Inherit the parent's decision; fall back to the inner sampler for roots.
    ParentBased(Box<Sampler>),
}

impl Sampler {
    pub fn should_sample(&self, parent: Option<&SpanContext>, trace_id: TraceId) -> bool {
        match self {
            Sampler::AlwaysOn => true,
            Sampler::AlwaysOff => false,
            Sampler::TraceIdRatio(ratio) => ratio_decision(*ratio, trace_id),
            Sampler::ParentBased(root) => match parent {
                Some(parent) => parent.sampled,
                None => root.should_sample(None, trace_id),
            },
        }
    }
}

impl From<&SamplerConfig> for Sampler {
    fn from(config: &SamplerConfig) -> Self {
        match *config {
            SamplerConfig::AlwaysOn => Sampler::AlwaysOn,
            SamplerConfig::AlwaysOff => Sampler::AlwaysOff,
            SamplerConfig::TraceIdRatio { ratio } => Sampler::TraceIdRatio(ratio),
            SamplerConfig::ParentBased { ratio } => {
                Sampler::ParentBased(Box::new(Sampler::TraceIdRatio(ratio)))
            }
        }
    }
}

// Uses the low 63 bits of the trace id so every process reaches the same
// decision for a given trace.
fn ratio_decision(ratio: f64, trace_id: TraceId) -> bool {
    if ratio >= 1.0 {
        return true;
    }
    if ratio <= 0.0 || ratio.is_nan() {
        return false;
    }
    let bound = (ratio * (1u64 << 63) as f64) as u64;
    let value = (trace_id.to_u128() as u64) >> 1;
    value < bound
}
