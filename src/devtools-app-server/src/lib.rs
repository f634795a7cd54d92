//! Devtools App Server - read-only HTTP access to a development tree.
//!
//! This crate provides:
//! - `GET /health`, unauthenticated
//! - `GET /list`, `POST /read` and `POST /search` behind a shared API key
//! - Request IDs, timing logs and per-request timeouts
//!
//! Every path is resolved through [`devtools_sandbox::PathGuard`]; the file
//! operations themselves live in `devtools-files`.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use auth::RequestAuthenticator;
pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Run the server with the given configuration.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Run the server with graceful shutdown support.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::new(config.clone())?);

    if !state.authenticator.is_configured() {
        warn!("No API key configured!");
        warn!("/list, /read and /search will answer 500 until one is set.");
        warn!("Set DEVTOOLS_API_KEY or auth.api_key in the config file.");
    }

    let app = create_router_with_state(Arc::clone(&state));

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!(root = %state.guard.root().display(), "Serving sandbox root");
    info!("Starting devtools server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    // In-flight requests get shutdown_timeout once the signal has fired
    let drain_timeout = Duration::from_secs(config.shutdown_timeout);
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown = async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    };
    let drain_deadline = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(drain_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .into_future();

    tokio::select! {
        result = server => result?,
        _ = drain_deadline => {
            warn!(
                "Graceful shutdown timed out after {:?}, dropping open connections",
                drain_timeout
            );
        }
    }

    info!("Server shut down");
    Ok(())
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    create_router_with_state(Arc::new(state))
}

/// Create the application router with an Arc-wrapped state.
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let config = &state.config;

    api::routes(Arc::clone(&state))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::timeout_middleware,
        ))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::timing_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::cors_layer(&config.cors_origins))
        .with_state(state)
}
