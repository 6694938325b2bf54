//! Demo service for the request-tracing interceptor.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TraceLayer (access log)
//!                       → RequestTracingLayer (span start, parent extraction)
//!                         → handlers (child spans via RequestSpan)
//!                       ← span tagged and finished
//!     ◀────────────── response, unchanged
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use trace_interceptor::config::{load_config, override_bind_address, AppConfig};
use trace_interceptor::observability::{init_logging, TracerService};
use trace_interceptor::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "trace-interceptor")]
#[command(about = "HTTP service with per-request distributed tracing", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config = override_bind_address(config, bind)?;
    }

    init_logging(&config.logging)?;
    tracing::info!("trace-interceptor v{} starting", env!("CARGO_PKG_VERSION"));

    let tracer = Arc::new(TracerService::init(&config.tracer));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::clone(&tracer));
    server.run(listener, shutdown.subscribe()).await?;

    tracer.shutdown()?;
    tracing::info!("Shutdown complete");
    Ok(())
}
