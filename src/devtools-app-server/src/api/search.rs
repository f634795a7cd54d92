//! Tree search endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use devtools_files::SearchResults;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::state::AppState;

use super::run_blocking;
use super::types::SearchRequest;

/// Search file contents under the root.
///
/// The walk is cancelled if this future is dropped, e.g. on timeout or when
/// the client disconnects.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> AppResult<Json<SearchResults>> {
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let results = run_blocking(move || {
        Ok(state
            .searcher
            .search_cancellable(&req.query, req.max_results, &cancel)?)
    })
    .await?;
    Ok(Json(results))
}
