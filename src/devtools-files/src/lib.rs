//! Read-only file operations over a sandboxed tree.
//!
//! - [`DirectoryLister`]: shallow listings, hidden entries skipped
//! - [`RangeReader`]: inclusive line ranges of size-capped files
//! - [`TreeSearcher`]: literal, case-insensitive substring search
//!
//! Listing and reading go through [`devtools_sandbox::PathGuard`]. Tree
//! search walks from the root and applies only the filename and extension
//! deny rules to each candidate.
//!
//! All operations are synchronous; async callers should run them on a
//! blocking thread.

pub mod error;
pub mod listing;
pub mod reading;
pub mod search;
pub mod text;

pub use error::{FileOpsError, FileOpsResult};
pub use listing::{DirectoryEntry, DirectoryLister, EntryKind, Listing, MAX_LIST_ENTRIES};
pub use reading::{
    DEFAULT_END_LINE, DEFAULT_START_LINE, FileSlice, MAX_READ_BYTES, RangeReader,
};
pub use search::{
    DEFAULT_MAX_RESULTS, MAX_MATCH_CHARS, MAX_RESULTS, SearchHit, SearchResults, TreeSearcher,
};
