//! Listing and reading endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use devtools_files::FileSlice;

use crate::error::AppResult;
use crate::state::AppState;

use super::run_blocking;
use super::types::{ListQuery, ListResponse, ReadRequest};

/// List a directory, or report that the path is a file.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse>> {
    let listing = run_blocking(move || Ok(state.lister.list(&query.path)?)).await?;
    Ok(Json(listing.into()))
}

/// Read an inclusive line range of a file.
pub async fn read(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReadRequest>,
) -> AppResult<Json<FileSlice>> {
    let slice = run_blocking(move || {
        Ok(state.reader.read(&req.path, req.start_line, req.end_line)?)
    })
    .await?;
    Ok(Json(slice))
}
