//! Route handlers.

use axum::extract::State;

use crate::http::response::ApiError;
use crate::http::server::AppState;

/// `GET /test`: greet with the downstream message.
pub async fn greet(State(state): State<AppState>) -> Result<String, ApiError> {
    let ping = state.downstream.ping().await?;
    Ok(format!("{}{}", state.greeting, ping.message))
}
