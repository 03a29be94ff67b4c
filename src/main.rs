//! extension-gate - Authentication and rate-limiting gate for extension clients
//!
//! This is the main entry point for the extension-gate server.

use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use extension_gate::auth::{
    AuthGate, CleanupConfig, CleanupScheduler, GateConfig, RateLimitConfig,
};
use extension_gate::clock::SystemClock;
use extension_gate::config::Config;
use extension_gate::server::{AppState, Server};

/// extension-gate - Authentication and rate-limiting gate for extension clients
#[derive(Parser, Debug)]
#[command(name = "extension-gate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "EXTENSION_GATE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting extension-gate"
    );

    // Build the gate: single service object shared by middleware and sweeper
    let gate_config = GateConfig {
        token_expiry: Duration::hours(config.auth.token_expiry_hours),
        rate_limit: RateLimitConfig {
            max_per_window: config.auth.rate_limit.max_per_window,
            window: Duration::seconds(config.auth.rate_limit.window_secs as i64),
        },
        max_extensions: config.auth.max_extensions,
    };
    let gate = Arc::new(AuthGate::new(gate_config, Arc::new(SystemClock)));
    info!(
        max_extensions = config.auth.max_extensions,
        token_expiry_hours = config.auth.token_expiry_hours,
        "Authentication gate initialized"
    );

    // Background session sweeper, stopped through the shutdown broadcast
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let cleanup_config = CleanupConfig {
        interval: std::time::Duration::from_secs(config.cleanup.interval_secs),
        idle_threshold: Duration::days(config.cleanup.idle_expiry_days),
    };
    let scheduler = CleanupScheduler::new(cleanup_config, Arc::clone(&gate), shutdown_rx);
    let scheduler_handle = tokio::spawn(scheduler.run());

    let state = AppState { gate };
    let server = Server::new(config.server.clone(), state);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting HTTP server"
    );

    let result = server.run(shutdown_signal()).await;

    // Stop the sweeper and let any in-flight sweep finish
    let _ = shutdown_tx.send(());
    let _ = scheduler_handle.await;

    info!("extension-gate shutdown complete");
    result.map_err(Into::into)
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
