//! Middleware attached to every route.

pub mod metrics;
pub mod trace;
