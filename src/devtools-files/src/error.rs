//! Error types for file operations.

use std::path::PathBuf;

use devtools_sandbox::SandboxError;

/// Result type alias for file operations.
pub type FileOpsResult<T> = std::result::Result<T, FileOpsError>;

/// Errors surfaced by the lister, reader and searcher.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    /// The path was rejected by the sandbox.
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// The target does not exist (or is not the expected kind).
    #[error("{0}")]
    NotFound(String),

    /// The file exceeds the read cap.
    #[error("File too large ({size} bytes). Use smaller file or narrow.")]
    TooLarge { size: u64, max: u64 },

    /// The search query is empty after trimming.
    #[error("Empty query")]
    EmptyQuery,

    /// The search query could not be compiled.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// I/O error while accessing a validated path.
    #[error("I/O error: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileOpsError {
    /// Creates a new `NotFound` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates a new `Io` error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Missing targets and paths running through a file are "not found".
pub(crate) fn is_missing(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}
