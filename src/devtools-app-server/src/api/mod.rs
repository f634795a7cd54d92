//! REST API routes and handlers.

mod files;
mod health;
mod search;
pub mod types;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::auth_middleware;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub use types::{HealthResponse, ListQuery, ListResponse, ReadRequest, SearchRequest};

/// Create the API routes.
///
/// The data endpoints sit behind the API key layer, which runs before any
/// body is extracted. Health stays open.
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/list", get(files::list))
        .route("/read", post(files::read))
        .route("/search", post(search::search))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(protected)
}

/// Runs filesystem work on the blocking pool.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {e}")))?
}
