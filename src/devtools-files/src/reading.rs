//! Bounded line-range reads.

use std::fs;
use std::sync::Arc;

use devtools_sandbox::PathGuard;
use serde::Serialize;

use crate::error::{FileOpsError, FileOpsResult, is_missing};
use crate::text::{decode_lossy, read_capped, split_lines};

/// Largest file, in bytes, that will be read.
pub const MAX_READ_BYTES: u64 = 200_000;

/// Default first line of a read (1-based).
pub const DEFAULT_START_LINE: i64 = 1;

/// Default last line of a read (inclusive).
pub const DEFAULT_END_LINE: i64 = 200;

/// An inclusive range of lines from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSlice {
    pub path: String,
    pub start_line: i64,
    pub end_line: i64,
    pub total_lines: usize,
    pub content: String,
}

/// Reads line ranges of files inside the sandbox.
#[derive(Debug, Clone)]
pub struct RangeReader {
    guard: Arc<PathGuard>,
    max_bytes: u64,
}

impl RangeReader {
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self {
            guard,
            max_bytes: MAX_READ_BYTES,
        }
    }

    /// Overrides the size cap.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Reads lines `start_line..=end_line` of `relative`.
    ///
    /// The start is clamped to at least 1 and the end to at most the line
    /// count; an empty or inverted range yields empty content. Files over
    /// the size cap are rejected before their contents are read.
    pub fn read(&self, relative: &str, start_line: i64, end_line: i64) -> FileOpsResult<FileSlice> {
        let resolved = self.guard.resolve(relative)?;
        let path = resolved.as_path();

        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if is_missing(&e) => return Err(FileOpsError::not_found("File not found")),
            Err(e) => return Err(FileOpsError::io(path, e)),
        };
        if !metadata.is_file() {
            return Err(FileOpsError::not_found("File not found"));
        }

        let size = metadata.len();
        if size > self.max_bytes {
            return Err(FileOpsError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        // take() keeps a file that grew after the size check within the cap
        let bytes = read_capped(path, self.max_bytes).map_err(|e| FileOpsError::io(path, e))?;
        let text = decode_lossy(&bytes);
        let lines = split_lines(&text);
        let total_lines = lines.len();

        let start = start_line.max(1);
        let end = end_line.min(total_lines as i64);
        let content = if start > end {
            String::new()
        } else {
            lines[(start - 1) as usize..end as usize].join("\n")
        };

        Ok(FileSlice {
            path: resolved.relative().to_string(),
            start_line: start,
            end_line: end,
            total_lines,
            content,
        })
    }
}
