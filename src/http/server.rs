//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the `/test` handler
//! - Wire up middleware (request ID, tracing, metrics)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::downstream::{ClientBuildError, DownstreamClient};
use crate::http::handlers;
use crate::http::middleware::{metrics::track_requests, trace};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub downstream: DownstreamClient,
    pub greeting: Arc<str>,
}

/// Errors while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Downstream(#[from] ClientBuildError),
}

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &AppConfig) -> Result<Self, ServerError> {
        let state = AppState {
            downstream: DownstreamClient::new(&config.downstream)?,
            greeting: Arc::from(config.downstream.greeting.as_str()),
        };

        tracing::debug!(
            downstream = %state.downstream.url(),
            "HTTP server configured"
        );

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run top to bottom: the request id exists before the server
    /// span opens, so the span can carry it.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/test", get(handlers::greet))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(trace::make_span)
                            .on_response(trace::on_response),
                    )
                    .layer(from_fn(track_requests)),
            )
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
