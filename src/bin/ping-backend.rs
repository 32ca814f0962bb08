//! Demo downstream service: `GET /ping` → `{"message": "pong"}`.
//!
//! Shares the tracing pipeline with the main service, so a request to
//! `/test` yields one trace spanning both processes.

use axum::{routing::get, Json, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use hello_trace::config::TelemetryConfig;
use hello_trace::downstream::PingResponse;
use hello_trace::http::middleware::trace;
use hello_trace::lifecycle::signals;
use hello_trace::observability;

#[derive(Parser)]
#[command(name = "ping-backend")]
#[command(about = "Downstream service for hello-trace", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    #[arg(short, long, default_value = "PingService")]
    service_name: String,

    #[arg(short, long, default_value = "pong")]
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let telemetry = observability::init(&TelemetryConfig {
        service_name: cli.service_name,
        ..TelemetryConfig::default()
    })?;

    let message = cli.message;
    let app = Router::new()
        .route(
            "/ping",
            get(move || async move { Json(PingResponse { message }) }),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::make_span)
                .on_response(trace::on_response),
        );

    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Ping backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(signals::shutdown_signal())
        .await?;

    telemetry.shutdown().await?;
    Ok(())
}
