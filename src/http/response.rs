//! Response shaping for handler errors.
//!
//! Every downstream failure becomes `500 {"message": "<error>"}`. The kind
//! of failure is logged and recorded on the request span but never changes
//! the status code or body shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::downstream::DownstreamError;

/// JSON error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Error returned by handlers.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] DownstreamError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        tracing::warn!(kind = self.0.kind(), error = %message, "Downstream call failed");
        tracing::Span::current().record("error.message", message.as_str());

        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { message })).into_response()
    }
}
