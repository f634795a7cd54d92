//! Literal substring search across the sandbox tree.

use std::path::Path;
use std::sync::Arc;

use devtools_sandbox::PathGuard;
use ignore::WalkBuilder;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{FileOpsError, FileOpsResult};
use crate::reading::MAX_READ_BYTES;
use crate::text::{decode_lossy, read_capped, split_lines, truncate_chars};

/// Default number of hits returned.
pub const DEFAULT_MAX_RESULTS: i64 = 20;

/// Hard ceiling on hits per search.
pub const MAX_RESULTS: usize = 50;

/// Matched lines are cut to this many characters.
pub const MAX_MATCH_CHARS: usize = 300;

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub line: usize,
    #[serde(rename = "match")]
    pub text: String,
}

/// Hits for one query, in walk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// Walks the sandbox root and matches file contents line by line.
///
/// Only the filename and extension deny rules apply here; denied directory
/// prefixes are enforced by [`PathGuard::resolve`] for list and read, not
/// during the walk.
#[derive(Debug, Clone)]
pub struct TreeSearcher {
    guard: Arc<PathGuard>,
    max_file_bytes: u64,
}

impl TreeSearcher {
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self {
            guard,
            max_file_bytes: MAX_READ_BYTES,
        }
    }

    /// Overrides the per-file size cap; larger files are skipped.
    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Searches for `query`, returning at most `max_results` hits.
    pub fn search(&self, query: &str, max_results: i64) -> FileOpsResult<SearchResults> {
        self.search_cancellable(query, max_results, &CancellationToken::new())
    }

    /// Like [`search`](Self::search), stopping early once `cancel` fires.
    ///
    /// A cancelled search returns the hits collected so far.
    pub fn search_cancellable(
        &self,
        query: &str,
        max_results: i64,
        cancel: &CancellationToken,
    ) -> FileOpsResult<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FileOpsError::EmptyQuery);
        }

        let limit = clamp_max_results(max_results);
        let pattern = literal_pattern(query)?;
        let root = self.guard.root();
        let policy = self.guard.policy();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .follow_links(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .require_git(false)
            .build();

        let mut results = Vec::new();

        for entry in walker {
            if cancel.is_cancelled() {
                debug!(query, hits = results.len(), "Search cancelled");
                break;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Error walking directory: {}", e);
                    continue;
                }
            };

            if entry.depth() == 0 || entry.file_type().is_some_and(|ft| ft.is_dir()) {
                continue;
            }

            if policy.denies_file_name(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let path = entry.path();
            if let Err(e) = self.scan_file(path, &pattern, limit, &mut results) {
                debug!(path = %path.display(), "Skipping unreadable file: {}", e);
                continue;
            }

            if results.len() >= limit {
                break;
            }
        }

        Ok(SearchResults {
            query: query.to_string(),
            results,
        })
    }

    /// Appends hits from one file until `limit` total hits are collected.
    ///
    /// Non-regular and oversized files are skipped without error.
    fn scan_file(
        &self,
        path: &Path,
        pattern: &Regex,
        limit: usize,
        results: &mut Vec<SearchHit>,
    ) -> std::io::Result<()> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() || metadata.len() > self.max_file_bytes {
            return Ok(());
        }

        let bytes = read_capped(path, self.max_file_bytes)?;
        let text = decode_lossy(&bytes);
        let relative = self.guard.relative_display(path);

        for (idx, line) in split_lines(&text).into_iter().enumerate() {
            if !pattern.is_match(line) {
                continue;
            }
            results.push(SearchHit {
                path: relative.clone(),
                line: idx + 1,
                text: truncate_chars(line, MAX_MATCH_CHARS).to_string(),
            });
            if results.len() >= limit {
                break;
            }
        }

        Ok(())
    }
}

/// Clamps a requested hit count into `1..=MAX_RESULTS`.
pub fn clamp_max_results(requested: i64) -> usize {
    requested.clamp(1, MAX_RESULTS as i64) as usize
}

/// Case-insensitive matcher for `query` as literal text.
fn literal_pattern(query: &str) -> FileOpsResult<Regex> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| FileOpsError::InvalidQuery(e.to_string()))
}
