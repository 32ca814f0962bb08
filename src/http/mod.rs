//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/ (request id, server span, metrics)
//!     → handlers.rs (GET /test)
//!     → client.rs (traced outbound call, via crate::downstream)
//!     → response.rs (error envelope)
//!     → Send to client
//! ```

pub mod client;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;

pub use client::TracedClient;
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer, ServerError};
