//! Demo web service with a hand-wired tracing pipeline.
//!
//! `GET /test` calls a downstream ping service and answers
//! `"Hello World! " + message`. Every inbound request and every outbound
//! call produces a span; spans are printed to the console by default.

pub mod config;
pub mod downstream;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{init as init_telemetry, TelemetryHandle};
