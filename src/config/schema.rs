//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The service called by `GET /test`.
    pub downstream: DownstreamConfig,

    /// Tracing pipeline and log settings.
    pub telemetry: TelemetryConfig,

    /// Prometheus exporter settings.
    pub metrics: MetricsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Downstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Absolute URL fetched for every `GET /test`.
    pub url: String,

    /// Text prepended to the downstream `message`.
    pub greeting: String,

    /// Overall request timeout in seconds. Unset means the client default (none).
    pub timeout_secs: Option<u64>,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/ping".to_string(),
            greeting: "Hello World! ".to_string(),
            timeout_secs: None,
        }
    }
}

/// Tracing pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every exported span.
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// The single active span exporter.
    pub exporter: ExporterConfig,

    /// Sampling strategy for new traces.
    pub sampler: SamplerConfig,

    /// Batch span processor tuning.
    pub batch: BatchConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "RustDemoService".to_string(),
            log_level: "info".to_string(),
            exporter: ExporterConfig::default(),
            sampler: SamplerConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

/// Span exporter selection.
///
/// ```toml
/// [telemetry.exporter]
/// kind = "otlp"
/// endpoint = "http://localhost:4318/v1/traces"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExporterConfig {
    /// Write spans to stdout.
    Console {
        #[serde(default)]
        pretty: bool,
    },
    /// OTLP over HTTP with JSON encoding.
    Otlp {
        #[serde(default = "default_otlp_endpoint")]
        endpoint: String,
    },
    /// Zipkin v2 JSON API.
    Zipkin {
        #[serde(default = "default_zipkin_endpoint")]
        endpoint: String,
    },
}

impl Default for ExporterConfig {
    fn default() -> Self {
        ExporterConfig::Console { pretty: false }
    }
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4318/v1/traces".to_string()
}

fn default_zipkin_endpoint() -> String {
    "http://localhost:9411/api/v2/spans".to_string()
}

/// Sampler selection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplerConfig {
    #[default]
    AlwaysOn,
    AlwaysOff,
    /// Sample a fixed fraction of traces, keyed on the trace id.
    TraceIdRatio { ratio: f64 },
    /// Follow the parent's decision; use the ratio for root spans.
    ParentBased { ratio: f64 },
}

/// Batch span processor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Spans held in memory before new ones are dropped.
    pub max_queue_size: usize,

    /// Maximum spans per export call.
    pub max_export_batch_size: usize,

    /// Delay between scheduled exports in milliseconds.
    pub scheduled_delay_ms: u64,

    /// Timeout for network exporters in seconds.
    pub export_timeout_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 2048,
            max_export_batch_size: 512,
            scheduled_delay_ms: 1000,
            export_timeout_secs: 10,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus scrape endpoint.
    pub enabled: bool,

    /// Metrics endpoint bind address.
    pub bind_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "0.0.0.0:9464".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.downstream.url, "http://localhost:8080/ping");
        assert_eq!(config.downstream.greeting, "Hello World! ");
        assert_eq!(config.telemetry.exporter, ExporterConfig::Console { pretty: false });
        assert_eq!(config.telemetry.sampler, SamplerConfig::AlwaysOn);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_tagged_exporter_and_sampler() {
        let config: AppConfig = toml::from_str(
            r#"
            [telemetry]
            service_name = "svc"

            [telemetry.exporter]
            kind = "zipkin"

            [telemetry.sampler]
            kind = "trace_id_ratio"
            ratio = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.telemetry.service_name, "svc");
        assert_eq!(
            config.telemetry.exporter,
            ExporterConfig::Zipkin {
                endpoint: "http://localhost:9411/api/v2/spans".into()
            }
        );
        assert_eq!(config.telemetry.sampler, SamplerConfig::TraceIdRatio { ratio: 0.1 });
        // untouched sections keep their defaults
        assert_eq!(config.telemetry.batch.max_queue_size, 2048);
    }

    #[test]
    fn test_unknown_exporter_kind_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [telemetry.exporter]
            kind = "jaeger"
            "#,
        );
        assert!(result.is_err());
    }
}
