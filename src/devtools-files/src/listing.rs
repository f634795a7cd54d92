//! Shallow directory listings.

use std::fs;
use std::sync::Arc;

use devtools_sandbox::PathGuard;
use serde::Serialize;
use tracing::debug;

use crate::error::{FileOpsError, FileOpsResult, is_missing};

/// Maximum number of entries returned for one directory.
pub const MAX_LIST_ENTRIES: usize = 500;

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// Result of listing a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The path is a regular file; no contents are listed.
    File { path: String },
    /// The path is a directory.
    Directory {
        path: String,
        entries: Vec<DirectoryEntry>,
    },
}

impl Listing {
    /// Path relative to the sandbox root.
    pub fn path(&self) -> &str {
        match self {
            Self::File { path } | Self::Directory { path, .. } => path,
        }
    }
}

/// Lists directories inside the sandbox.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    guard: Arc<PathGuard>,
    max_entries: usize,
}

impl DirectoryLister {
    pub fn new(guard: Arc<PathGuard>) -> Self {
        Self {
            guard,
            max_entries: MAX_LIST_ENTRIES,
        }
    }

    /// Overrides the entry cap.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Lists the immediate children of `relative`.
    ///
    /// Dot-prefixed names are skipped, the rest are sorted by name and
    /// silently capped. A regular file yields [`Listing::File`].
    pub fn list(&self, relative: &str) -> FileOpsResult<Listing> {
        let resolved = self.guard.resolve(relative)?;
        let path = resolved.as_path();

        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if is_missing(&e) => return Err(FileOpsError::not_found("Not found")),
            Err(e) => return Err(FileOpsError::io(path, e)),
        };

        if metadata.is_file() {
            return Ok(Listing::File {
                path: resolved.relative().to_string(),
            });
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| FileOpsError::io(path, e))? {
            let entry = entry.map_err(|e| FileOpsError::io(path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            children.push((name, entry.path()));
        }

        children.sort_by(|a, b| a.0.cmp(&b.0));
        if children.len() > self.max_entries {
            debug!(
                path = %resolved.relative(),
                total = children.len(),
                "Truncating directory listing"
            );
        }

        let entries = children
            .into_iter()
            .take(self.max_entries)
            .map(|(name, child)| DirectoryEntry {
                name,
                kind: if child.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
            })
            .collect();

        Ok(Listing::Directory {
            path: resolved.relative().to_string(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devtools_sandbox::{DenyPolicy, SandboxError};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DirectoryLister) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("a/sub")).unwrap();
        fs::create_dir_all(root.join("a/.git")).unwrap();
        fs::write(root.join("a/b.txt"), "hello\nworld\n").unwrap();
        fs::write(root.join("a/Z.md"), "z").unwrap();
        fs::write(root.join("a/.hidden"), "h").unwrap();

        let guard = PathGuard::new(root, DenyPolicy::permissive()).unwrap();
        (temp_dir, DirectoryLister::new(Arc::new(guard)))
    }

    fn entry(name: &str, kind: EntryKind) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn test_list_directory_sorted_without_hidden() {
        let (_temp_dir, lister) = setup();
        let listing = lister.list("a").unwrap();

        assert_eq!(
            listing,
            Listing::Directory {
                path: "a".to_string(),
                entries: vec![
                    entry("Z.md", EntryKind::File),
                    entry("b.txt", EntryKind::File),
                    entry("sub", EntryKind::Directory),
                ],
            }
        );
    }

    #[test]
    fn test_list_root() {
        let (_temp_dir, lister) = setup();
        let listing = lister.list("").unwrap();
        assert_eq!(listing.path(), ".");
        match listing {
            Listing::Directory { entries, .. } => {
                assert_eq!(entries, vec![entry("a", EntryKind::Directory)]);
            }
            other => panic!("expected directory, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_classified_by_target() {
        use std::os::unix::fs::symlink;

        let (temp_dir, lister) = setup();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("links")).unwrap();
        symlink(root.join("a/sub"), root.join("links/to_dir")).unwrap();
        symlink(root.join("a/b.txt"), root.join("links/to_file")).unwrap();
        symlink(root.join("a/gone"), root.join("links/broken")).unwrap();

        match lister.list("links").unwrap() {
            Listing::Directory { entries, .. } => {
                assert_eq!(
                    entries,
                    vec![
                        entry("broken", EntryKind::File),
                        entry("to_dir", EntryKind::Directory),
                        entry("to_file", EntryKind::File),
                    ]
                );
            }
            other => panic!("expected directory, got {other:?}"),
        }
    }

    #[test]
    fn test_list_file_returns_file_kind() {
        let (_temp_dir, lister) = setup();
        let listing = lister.list("a/b.txt").unwrap();
        assert_eq!(
            listing,
            Listing::File {
                path: "a/b.txt".to_string()
            }
        );
    }

    #[test]
    fn test_list_missing_is_not_found() {
        let (_temp_dir, lister) = setup();
        let err = lister.list("a/missing").unwrap_err();
        assert!(matches!(err, FileOpsError::NotFound(_)));

        let err = lister.list("a/b.txt/below").unwrap_err();
        assert!(matches!(err, FileOpsError::NotFound(_)));
    }

    #[test]
    fn test_list_escape_is_rejected() {
        let (_temp_dir, lister) = setup();
        let err = lister.list("../..").unwrap_err();
        assert!(matches!(
            err,
            FileOpsError::Sandbox(SandboxError::Escape { .. })
        ));
    }

    #[test]
    fn test_list_caps_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..(MAX_LIST_ENTRIES + 25) {
            fs::write(root.join(format!("f{i:04}.txt")), "").unwrap();
        }
        let guard = PathGuard::new(root, DenyPolicy::permissive()).unwrap();
        let lister = DirectoryLister::new(Arc::new(guard));

        match lister.list("").unwrap() {
            Listing::Directory { entries, .. } => {
                assert_eq!(entries.len(), MAX_LIST_ENTRIES);
                assert_eq!(entries[0].name, "f0000.txt");
                assert_eq!(entries[MAX_LIST_ENTRIES - 1].name, "f0499.txt");
            }
            other => panic!("expected directory, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_cap() {
        let (_temp_dir, lister) = setup();
        let lister = lister.with_max_entries(1);
        match lister.list("a").unwrap() {
            Listing::Directory { entries, .. } => {
                assert_eq!(entries, vec![entry("Z.md", EntryKind::File)]);
            }
            other => panic!("expected directory, got {other:?}"),
        }
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(entry("src", EntryKind::Directory)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "src", "type": "dir"}));
        let json = serde_json::to_value(entry("b.txt", EntryKind::File)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "b.txt", "type": "file"}));
    }
}
