//! Sandbox boundary: validates untrusted relative paths.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use tracing::warn;

use crate::canonical::soft_canonicalize;
use crate::error::{SandboxError, SandboxResult};
use crate::policy::DenyPolicy;

/// A path that passed [`PathGuard::resolve`].
///
/// Only the guard can construct one, so holding a `ResolvedPath` means the
/// path is canonical, inside the root and clear of every deny rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
}

impl ResolvedPath {
    /// Canonical absolute path, safe for I/O.
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Path relative to the sandbox root, `/`-separated; the root is `.`.
    pub fn relative(&self) -> &str {
        &self.relative
    }
}

/// Validates paths against a fixed root and a [`DenyPolicy`].
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
    root_str: String,
    root_prefix: String,
    policy: DenyPolicy,
}

impl PathGuard {
    /// Creates a guard rooted at `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>, policy: DenyPolicy) -> SandboxResult<Self> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .map_err(|e| SandboxError::invalid_root(root, e.to_string()))?;
        if !canonical.is_dir() {
            return Err(SandboxError::invalid_root(root, "not a directory"));
        }

        let root_str = canonical.to_string_lossy().into_owned();
        let root_prefix = if root_str.ends_with(MAIN_SEPARATOR) {
            root_str.clone()
        } else {
            format!("{root_str}{MAIN_SEPARATOR}")
        };

        Ok(Self {
            root: canonical,
            root_str,
            root_prefix,
            policy,
        })
    }

    /// Canonical sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deny rules enforced by this guard.
    pub fn policy(&self) -> &DenyPolicy {
        &self.policy
    }

    /// Validates a caller-supplied path relative to the root.
    ///
    /// Checks run in a fixed order: containment, then denied directories,
    /// then denied names. The empty string resolves to the root.
    pub fn resolve(&self, relative: &str) -> SandboxResult<ResolvedPath> {
        let canonical = soft_canonicalize(&self.root.join(relative));
        let canonical_str = canonical.to_string_lossy();

        if !self.contains(&canonical_str) {
            warn!(path = %relative, "Rejected path outside sandbox root");
            return Err(SandboxError::escape(relative));
        }

        if self.policy.denies_directory(&canonical_str) {
            warn!(path = %relative, "Rejected path under denied directory");
            return Err(SandboxError::DeniedDirectory {
                path: canonical.clone(),
            });
        }

        if self.policy.denies_path_name(&canonical) {
            let name = canonical
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            warn!(path = %relative, "Rejected denied file name");
            return Err(SandboxError::DeniedName { name });
        }

        let relative = self.relative_display(&canonical);
        Ok(ResolvedPath {
            absolute: canonical,
            relative,
        })
    }

    /// Textual containment test on a canonical path string.
    ///
    /// The path must equal the root or continue it with a separator, so a
    /// sibling such as `/x/devious` is outside a root of `/x/dev`.
    pub fn contains(&self, canonical: &str) -> bool {
        canonical == self.root_str || canonical.starts_with(&self.root_prefix)
    }

    /// Renders a path under the root as a `/`-separated relative string.
    ///
    /// Paths outside the root are rendered as given.
    pub fn relative_display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }
}
