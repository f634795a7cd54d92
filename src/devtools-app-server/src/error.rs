//! Error types for the app server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devtools_files::FileOpsError;
use devtools_sandbox::SandboxError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or wrong credential.
    #[error("{0}")]
    Unauthorized(String),

    /// No secret configured for the process.
    #[error("{0}")]
    Misconfigured(String),

    /// Path rejected by a deny rule.
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request.
    #[error("{0}")]
    BadRequest(String),

    /// File exceeds the read cap.
    #[error("{message}")]
    PayloadTooLarge { message: String, size: u64 },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Misconfigured(_) => "server_misconfigured",
            Self::Forbidden(_) => "not_allowed",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Timeout => "timeout",
            Self::Internal(_) => "internal_error",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::PayloadTooLarge { size, .. } => Some(serde_json::json!({ "size": size })),
            _ => None,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for the app server.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<SandboxError> for AppError {
    fn from(error: SandboxError) -> Self {
        if error.is_denied() {
            return Self::Forbidden(error.to_string());
        }
        match &error {
            SandboxError::Escape { .. } => Self::BadRequest(error.to_string()),
            _ => Self::Internal(error.to_string()),
        }
    }
}

impl From<FileOpsError> for AppError {
    fn from(error: FileOpsError) -> Self {
        match error {
            FileOpsError::Sandbox(e) => e.into(),
            FileOpsError::NotFound(message) => Self::NotFound(message),
            FileOpsError::TooLarge { size, .. } => Self::PayloadTooLarge {
                message: too_large_message(size),
                size,
            },
            FileOpsError::EmptyQuery => Self::BadRequest("Empty query".to_string()),
            FileOpsError::InvalidQuery(message) => Self::BadRequest(message),
            FileOpsError::Io { path, source } => {
                error!(path = %path.display(), "I/O error: {}", source);
                Self::Internal(format!("I/O error: {source}"))
            }
        }
    }
}

fn too_large_message(size: u64) -> String {
    format!("File too large ({size} bytes). Use smaller file or narrow.")
}
