use std::path::PathBuf;

use clap::Parser;
use hearth_station::{Station, config::Config};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "hearth-station")]
#[command(about = "Hearth control station gateway")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "hearth-station.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "hearth_station=info,tower_http=info".to_owned());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };
    config.apply_env(|key| std::env::var(key).ok())?;

    let Station { router, log_worker } = Station::from_config(&config)?;

    let http_addr = config.server.http_addr;
    let listener = TcpListener::bind(http_addr).await?;
    info!(%http_addr, "Starting service");

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
        }
        shutdown.cancel();
    });

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "HTTP server error");
    }
    info!("HTTP server shut down");

    log_worker.shutdown().await;

    Ok(result?)
}
