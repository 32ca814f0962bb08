//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to the tracing bootstrap and the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the service runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::AppConfig;
pub use schema::BatchConfig;
pub use schema::DownstreamConfig;
pub use schema::ExporterConfig;
pub use schema::ListenerConfig;
pub use schema::MetricsConfig;
pub use schema::SamplerConfig;
pub use schema::TelemetryConfig;
pub use validation::{validate_config, ValidationError};
