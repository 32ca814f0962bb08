//! Startup orchestration.
//!
//! Order: validated config → tracing bootstrap → metrics → listener bind →
//! serve → tracing shutdown. Any startup error is fatal; the tracing
//! pipeline is always flushed once it has been installed.

use tokio::net::TcpListener;

use crate::config::{AppConfig, ConfigError};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{self, metrics, TelemetryError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Metrics(#[from] metrics::MetricsError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the service until SIGINT/SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());
    run_until(config, shutdown).await
}

/// Run the service until `shutdown` is triggered.
pub async fn run_until(config: AppConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let telemetry = observability::init(&config.telemetry)?;

    let served = serve(&config, &shutdown).await;

    // flush spans even when serving failed
    if let Err(e) = telemetry.shutdown().await {
        tracing::error!(error = %e, "Failed to flush spans");
    }
    served
}

async fn serve(config: &AppConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    // subscribe before binding so a trigger right after the port opens is seen
    let server_shutdown = shutdown.subscribe();

    if config.metrics.enabled {
        metrics::install(&config.metrics)?;
    }

    let server = HttpServer::new(config)?;

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;
    if let Ok(local) = listener.local_addr() {
        tracing::info!(port = local.port(), "Example app listening on port {}", local.port());
    }

    server
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
