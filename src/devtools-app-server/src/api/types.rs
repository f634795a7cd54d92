//! API request and response types.

use devtools_files::{DEFAULT_END_LINE, DEFAULT_MAX_RESULTS, DEFAULT_START_LINE};
use devtools_files::{DirectoryEntry, EntryKind, Listing};
use serde::{Deserialize, Serialize};

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

// ============================================================================
// Listing
// ============================================================================

/// Query parameters for `GET /list`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Path relative to the root; empty lists the root itself.
    #[serde(default)]
    pub path: String,
}

/// Listing response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListResponse {
    Directory {
        path: String,
        items: Vec<DirectoryEntry>,
    },
    File {
        path: String,
        #[serde(rename = "type")]
        kind: EntryKind,
    },
}

impl From<Listing> for ListResponse {
    fn from(listing: Listing) -> Self {
        match listing {
            Listing::Directory { path, entries } => Self::Directory {
                path,
                items: entries,
            },
            Listing::File { path } => Self::File {
                path,
                kind: EntryKind::File,
            },
        }
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Request body for `POST /read`.
#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub path: String,
    #[serde(default = "default_start_line")]
    pub start_line: i64,
    #[serde(default = "default_end_line")]
    pub end_line: i64,
}

fn default_start_line() -> i64 {
    DEFAULT_START_LINE
}

fn default_end_line() -> i64 {
    DEFAULT_END_LINE
}

// ============================================================================
// Search
// ============================================================================

/// Request body for `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: i64,
}

fn default_max_results() -> i64 {
    DEFAULT_MAX_RESULTS
}
