//! statsfwd binary
//!
//! Runs a forwarding client against the process-wide engine until Ctrl+C.

mod cli;
mod demo;

use anyhow::Result;
use cli::Cli;
use stats_datadog::Client;
use stats_engine::default_engine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEMO_PERIOD: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("statsfwd starting...");

    let config = cli.client_config()?;
    tracing::info!(
        "Forwarding to {} every {:?} (buffer {} bytes)",
        config.address,
        config.flush_interval,
        config.buffer_size
    );

    let engine = default_engine();
    let client = Client::builder(config).engine(Arc::clone(&engine)).start();

    let (demo_tx, demo_rx) = watch::channel(false);
    let demo = cli
        .demo
        .then(|| tokio::spawn(demo::run(Arc::clone(&engine), DEMO_PERIOD, demo_rx)));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    demo_tx.send_replace(true);
    if let Some(handle) = demo {
        if let Err(e) = handle.await {
            tracing::warn!("Demo task failed: {}", e);
        }
    }

    client.close().await;
    tracing::info!("statsfwd stopped");

    Ok(())
}
