//! Wall Connector Exporter - Entry Point
//!
//! Serves Tesla Wall Connector readings as Prometheus metrics.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use wallconnector_exporter::config::Overrides;
use wallconnector_exporter::{server, Config, Exporter, VERSION};

/// Prometheus exporter for the Tesla Wall Connector
#[derive(Parser)]
#[command(name = "wallconnector-exporter")]
#[command(version = VERSION)]
#[command(about = "Prometheus exporter for the Tesla Wall Connector local API")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wall Connector address (host or host:port)
    #[arg(long)]
    device_address: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Address to serve metrics on
    #[arg(long)]
    listen_addr: Option<SocketAddr>,
}

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration; a missing device address stops here
    let config = Config::resolve(
        cli.config.as_deref(),
        Overrides {
            device_address: cli.device_address,
            timeout_ms: cli.timeout_ms,
            listen_addr: cli.listen_addr,
        },
    )
    .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    wallconnector_exporter::util::init_tracing(&config.logging)?;

    info!(
        version = VERSION,
        device = %config.device.base_url(),
        timeout_ms = config.device.timeout_ms,
        listen_addr = %config.web.listen_addr,
        metrics_path = %config.web.metrics_path,
        "Starting Wall Connector Exporter"
    );

    let exporter = Arc::new(Exporter::new(&config));
    let router = server::router(exporter, &config.web.metrics_path);

    server::serve(router, config.web.listen_addr, async {
        server::shutdown_signal().await;
        info!("Shutdown signal received");
    })
    .await?;

    info!("Exporter stopped");
    Ok(())
}
