//! Devtools App Server - HTTP API server binary.

use std::process::ExitCode;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use devtools_app_server::{ServerConfig, run_with_shutdown};
use devtools_sandbox::expand_tilde;

/// Devtools API Server
#[derive(Parser)]
#[command(name = "devtools-server")]
#[command(about = "Read-only HTTP access to a development directory")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address (overrides config and environment)
    #[arg(short, long)]
    listen: Option<String>,

    /// Sandbox root (overrides config and environment)
    #[arg(short, long)]
    root: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

fn load_config(args: &Args) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config from {path}: {e}"))?,
        None => ServerConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config from environment: {e}"))?,
    };

    if let Some(listen) = &args.listen {
        config.listen_addr = listen.clone();
    }
    if let Some(root) = &args.root {
        config.root = expand_tilde(root);
    }

    Ok(config)
}

async fn shutdown_signal(shutdown_timeout: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown (timeout: {}s)...", shutdown_timeout);
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown (timeout: {}s)...", shutdown_timeout);
        }
    }

    info!(
        "Waiting up to {}s for in-flight requests to complete...",
        shutdown_timeout
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(&args.log_level, args.json_logs);

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Graceful shutdown timeout: {}s", config.shutdown_timeout);
    info!("Press Ctrl+C to stop");

    let shutdown_timeout = config.shutdown_timeout;
    let result = run_with_shutdown(config, shutdown_signal(shutdown_timeout)).await;

    if let Err(e) = result {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}
