//! Health check endpoint.

use axum::Json;

use super::types::HealthResponse;

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
