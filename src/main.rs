//! hello-trace
//!
//! ```text
//!   client ──GET /test──▶ ┌──────────────────────────────┐ ──GET /ping──▶ ping service
//!                         │ request id → server span     │   traceparent
//!                         │ → metrics → handler          │
//!                         │        └─▶ traced client ────┼──────────────▶
//!   ◀── "Hello World! <message>" / 500 {"message": ...} ─┘
//!
//!   closed spans ─▶ export layer ─▶ batch processor ─▶ console | otlp | zipkin
//! ```

use std::path::PathBuf;

use clap::Parser;

use hello_trace::config::load_or_default;
use hello_trace::lifecycle::startup;

#[derive(Parser)]
#[command(name = "hello-trace")]
#[command(about = "Demo service that greets with a downstream message", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    startup::run(config).await?;
    Ok(())
}
