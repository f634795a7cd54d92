//! Static deny rules for secret-like paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::canonical::{expand_tilde, soft_canonicalize};

/// Directories denied by default, before `~` expansion.
pub const DEFAULT_DENY_DIRS: &[&str] = &["~/.ssh", "/etc", "/var/lib", "/var/log"];

/// Filenames denied by default.
pub const DEFAULT_DENY_FILENAMES: &[&str] = &[".env", ".env.local", "id_rsa", "id_ed25519"];

/// Extensions denied by default (leading dot, lowercase).
pub const DEFAULT_DENY_EXTENSIONS: &[&str] = &[".key", ".pem", ".p12", ".pfx"];

/// Deny rules applied on top of sandbox containment.
///
/// Directory prefixes are canonicalized once at construction; after that the
/// policy is immutable and cheap to share.
#[derive(Debug, Clone)]
pub struct DenyPolicy {
    dirs: Vec<PathBuf>,
    dir_prefixes: Vec<String>,
    filenames: HashSet<String>,
    extensions: HashSet<String>,
}

impl DenyPolicy {
    /// Builds a policy from raw rule lists.
    ///
    /// Directories may start with `~`. Extensions are matched
    /// case-insensitively and may be given with or without the leading dot.
    pub fn new<D, F, E>(dirs: D, filenames: F, extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let dirs: Vec<PathBuf> = dirs
            .into_iter()
            .map(|d| soft_canonicalize(&expand_tilde(d.as_ref())))
            .collect();
        let dir_prefixes = dirs
            .iter()
            .map(|d| d.to_string_lossy().into_owned())
            .collect();

        let extensions = extensions
            .into_iter()
            .map(|e| {
                let e = e.as_ref().to_lowercase();
                if e.starts_with('.') { e } else { format!(".{e}") }
            })
            .collect();

        Self {
            dirs,
            dir_prefixes,
            filenames: filenames.into_iter().map(Into::into).collect(),
            extensions,
        }
    }

    /// A policy that denies nothing.
    pub fn permissive() -> Self {
        Self::new(
            std::iter::empty::<&str>(),
            std::iter::empty::<String>(),
            std::iter::empty::<&str>(),
        )
    }

    /// Canonical denied directory prefixes.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Textual prefix test of a canonical path against the denied directories.
    ///
    /// This is a string comparison, so `/etc` also denies `/etcetera`.
    pub fn denies_directory(&self, canonical: &str) -> bool {
        self.dir_prefixes
            .iter()
            .any(|prefix| canonical.starts_with(prefix.as_str()))
    }

    /// Returns true if the filename is denied or carries a denied extension.
    pub fn denies_file_name(&self, name: &str) -> bool {
        if self.filenames.contains(name) {
            return true;
        }
        match suffix(name) {
            Some(ext) => self.extensions.contains(&ext),
            None => false,
        }
    }

    /// Applies [`denies_file_name`](Self::denies_file_name) to the last component of a path.
    pub fn denies_path_name(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| self.denies_file_name(&n.to_string_lossy()))
            .unwrap_or(false)
    }
}

impl Default for DenyPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_DENY_DIRS.iter().copied(),
            DEFAULT_DENY_FILENAMES.iter().map(|s| s.to_string()),
            DEFAULT_DENY_EXTENSIONS.iter().copied(),
        )
    }
}

/// Lowercased final suffix including the dot. `.env` has none.
fn suffix(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
