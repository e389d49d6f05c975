//! stockroom - A multi-user item tracking service
//!
//! This is the main entry point for the stockroom application.

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockroom::auth::{AccountService, RateLimitConfig, TokenService};
use stockroom::config::Config;
use stockroom::database::SqliteDatabase;
use stockroom::server::{AppState, Server};
use stockroom::storage::{AttachmentIngestor, FilesystemStore};

/// stockroom - A multi-user item tracking service
#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "STOCKROOM_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;

    init_tracing(&config.logging.level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting stockroom");

    // The signing secret has no default; refuse to start without it
    let token_secret = config.require_token_secret()?;
    let tokens = Arc::new(TokenService::new(token_secret, config.auth.token_ttl_secs));

    let database = Arc::new(SqliteDatabase::new(&config.database.path).await?);
    info!(path = %config.database.path, "Database initialized");

    let accounts = Arc::new(AccountService::new(
        Arc::clone(&database),
        RateLimitConfig::from(&config.auth.rate_limit),
    ));

    let store = FilesystemStore::new_with_init(&config.storage.upload_dir).await?;
    info!(dir = %config.storage.upload_dir, "Attachment storage initialized");
    let ingestor = Arc::new(AttachmentIngestor::new(Arc::new(store)));

    let state = AppState {
        accounts,
        tokens,
        database,
        ingestor,
    };

    let server = Server::new(config.server.clone(), state);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting HTTP server"
    );

    server.run(shutdown_signal()).await?;

    info!("stockroom shutdown complete");
    Ok(())
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
        None => {
            eprintln!("Loading configuration from environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
    }
}

/// Initialize tracing with the configured level as the default filter
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Create a future that resolves when a shutdown signal is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
