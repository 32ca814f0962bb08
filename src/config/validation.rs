//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs before anything binds or connects
//! - Validate value ranges (ratios, batch sizes, log level)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use url::Url;

use crate::config::schema::{AppConfig, BatchConfig, ExporterConfig, SamplerConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not an http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("telemetry.service_name must not be empty")]
    EmptyServiceName,

    #[error("telemetry.log_level: '{0}' is not one of off, error, warn, info, debug, trace")]
    InvalidLogLevel(String),

    #[error("telemetry.sampler.ratio must be within 0.0..=1.0, got {0}")]
    RatioOutOfRange(f64),

    #[error("telemetry.batch.{0} must be greater than zero")]
    ZeroBatchSetting(&'static str),

    #[error("telemetry.batch.max_export_batch_size ({batch}) exceeds max_queue_size ({queue})")]
    BatchExceedsQueue { batch: usize, queue: usize },
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    check_url("downstream.url", &config.downstream.url, &mut errors);

    let telemetry = &config.telemetry;
    if telemetry.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }
    if LevelFilter::from_str(&telemetry.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(telemetry.log_level.clone()));
    }

    match &telemetry.exporter {
        ExporterConfig::Console { .. } => {}
        ExporterConfig::Otlp { endpoint } => {
            check_url("telemetry.exporter.endpoint", endpoint, &mut errors)
        }
        ExporterConfig::Zipkin { endpoint } => {
            check_url("telemetry.exporter.endpoint", endpoint, &mut errors)
        }
    }

    match telemetry.sampler {
        SamplerConfig::TraceIdRatio { ratio } | SamplerConfig::ParentBased { ratio } => {
            if !(0.0..=1.0).contains(&ratio) {
                errors.push(ValidationError::RatioOutOfRange(ratio));
            }
        }
        SamplerConfig::AlwaysOn | SamplerConfig::AlwaysOff => {}
    }

    check_batch(&telemetry.batch, &mut errors);

    if config.metrics.enabled {
        check_address("metrics.bind_address", &config.metrics.bind_address, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_batch(batch: &BatchConfig, errors: &mut Vec<ValidationError>) {
    if batch.max_queue_size == 0 {
        errors.push(ValidationError::ZeroBatchSetting("max_queue_size"));
    }
    if batch.max_export_batch_size == 0 {
        errors.push(ValidationError::ZeroBatchSetting("max_export_batch_size"));
    }
    if batch.scheduled_delay_ms == 0 {
        errors.push(ValidationError::ZeroBatchSetting("scheduled_delay_ms"));
    }
    if batch.max_export_batch_size > batch.max_queue_size {
        errors.push(ValidationError::BatchExceedsQueue {
            batch: batch.max_export_batch_size,
            queue: batch.max_queue_size,
        });
    }
}
