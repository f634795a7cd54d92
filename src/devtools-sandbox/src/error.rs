//! Error types for path resolution.

use std::path::PathBuf;

/// Result type alias for sandbox operations.
pub type SandboxResult<T> = std::result::Result<T, SandboxError>;

/// Reasons a user-supplied path is rejected.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The resolved path lies outside the sandbox root.
    #[error("Path escapes sandbox root")]
    Escape { attempted: String },

    /// The resolved path lies under a denied directory prefix.
    #[error("Path not allowed")]
    DeniedDirectory { path: PathBuf },

    /// The final component is a denied filename or carries a denied extension.
    #[error("File not allowed")]
    DeniedName { name: String },

    /// The configured sandbox root cannot be used.
    #[error("Invalid sandbox root '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
}

impl SandboxError {
    /// Creates a new `Escape` error.
    pub fn escape(attempted: impl Into<String>) -> Self {
        Self::Escape {
            attempted: attempted.into(),
        }
    }

    /// Creates a new `InvalidRoot` error.
    pub fn invalid_root(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the deny-list rejections (directory or name).
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::DeniedDirectory { .. } | Self::DeniedName { .. })
    }
}
