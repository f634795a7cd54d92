//! Shared-key request authentication.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the API key unless configured otherwise.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Checks a presented key against the process secret.
#[derive(Clone)]
pub struct RequestAuthenticator {
    secret: Option<String>,
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl RequestAuthenticator {
    /// An empty secret is treated the same as no secret.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Whether a usable secret is configured.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Authenticates a request by its presented key.
    ///
    /// A missing secret fails every request as misconfigured, regardless of
    /// what the client sent.
    pub fn authenticate(&self, presented: Option<&str>) -> AppResult<()> {
        let Some(secret) = self.secret.as_deref() else {
            return Err(AppError::Misconfigured("Server missing API key".to_string()));
        };

        match presented {
            Some(key) if constant_time_compare(key.as_bytes(), secret.as_bytes()) => Ok(()),
            _ => Err(AppError::Unauthorized("Invalid API key".to_string())),
        }
    }
}

/// Extracts the API key from `header`, if present and valid ASCII.
pub fn extract_api_key<'a>(headers: &'a HeaderMap, header: &str) -> Option<&'a str> {
    headers.get(header).and_then(|v| v.to_str().ok())
}

/// Authentication middleware for the data endpoints.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = extract_api_key(request.headers(), &state.config.auth.header);

    if let Err(e) = state.authenticator.authenticate(presented) {
        match &e {
            AppError::Misconfigured(_) => {
                error!(path = %request.uri().path(), "Rejecting request, no API key configured")
            }
            _ => warn!(
                path = %request.uri().path(),
                key_present = presented.is_some(),
                "Rejecting request with invalid API key"
            ),
        }
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
