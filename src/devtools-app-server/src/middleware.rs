//! HTTP middleware components.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Request ID header name.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Request timing header name.
pub const REQUEST_TIMING_HEADER: &str = "X-Response-Time";

/// Request ID type.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Request ID middleware - adds unique ID to each request.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    // Keep a caller-supplied ID only if it can be echoed back as a header
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Timing middleware - tracks request duration.
pub async fn timing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    if let Ok(value) = HeaderValue::from_str(&format!("{duration_ms:.2}ms")) {
        response.headers_mut().insert(REQUEST_TIMING_HEADER, value);
    }

    // Query strings are left out of the log; they carry user paths
    let status = response.status();
    let duration_ms = format!("{duration_ms:.2}");
    if status.is_success() {
        info!(%method, %path, %status, %request_id, %duration_ms, "Request completed");
    } else if status.is_client_error() {
        warn!(%method, %path, %status, %request_id, %duration_ms, "Client error");
    } else {
        error!(%method, %path, %status, %request_id, %duration_ms, "Server error");
    }

    response
}

/// Timeout middleware.
pub async fn timeout_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let timeout_duration = state.config.request_timeout_duration();
    with_timeout(timeout_duration, request, next).await
}

async fn with_timeout(
    timeout_duration: Duration,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match timeout(timeout_duration, next.run(request)).await {
        Ok(response) => Ok(response),
        Err(_) => {
            error!("Request timed out after {:?}", timeout_duration);
            Err(AppError::Timeout)
        }
    }
}

/// CORS configuration.
pub fn cors_layer(origins: &[String]) -> tower_http::cors::CorsLayer {
    use tower_http::cors::{Any, CorsLayer};

    let max_age = Duration::from_secs(86400);

    if origins.is_empty() {
        CorsLayer::permissive().max_age(max_age)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(max_age)
    }
}
