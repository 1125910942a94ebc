//! finmate HTTP server

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use finmate::{init_tracing, router, ApiSettings, AppState, LedgerManager};
use finmate_config::{resolve_home_dir, ConfigManager, HOME_ENV};
use finmate_storage_json::JsonLedgerStorage;
use tokio::{net::TcpListener, signal};

/// Serves the finmate budgeting API over HTTP.
#[derive(Parser, Debug)]
#[command(name = "finmate-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base directory for configuration and data
    #[arg(long, env = HOME_ENV)]
    home: Option<PathBuf>,

    /// Path to the JSON configuration file
    #[arg(short, long, env = "FINMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "FINMATE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FINMATE_PORT")]
    port: Option<u16>,

    /// Directory holding ledger.json and its backups
    #[arg(long, env = "FINMATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Tracing filter, used when RUST_LOG is unset
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let home = args.home.clone().unwrap_or_else(resolve_home_dir);
    let config_manager = match &args.config {
        Some(path) => ConfigManager::new(path.clone()),
        None => ConfigManager::with_base_dir(&home)
            .with_context(|| format!("preparing config directory under {}", home.display()))?,
    };
    let mut config = config_manager
        .load()
        .with_context(|| format!("loading {}", config_manager.config_path().display()))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(filter) = args.log_filter {
        config.log_filter = filter;
    }

    init_tracing(&config.log_filter);

    let data_dir = args
        .data_dir
        .unwrap_or_else(|| config.resolve_data_dir(&home));
    let storage = JsonLedgerStorage::with_retention(&data_dir, config.backup_retention)
        .with_context(|| format!("opening ledger storage in {}", data_dir.display()))?;
    let manager = LedgerManager::open(Box::new(storage)).context("loading ledger")?;

    let state = AppState::new(manager, ApiSettings::from(&config));
    let app = router(state);

    let address = config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(%address, data_dir = %data_dir.display(), "finmate server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("finmate server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
