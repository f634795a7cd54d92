//! Non-strict path canonicalization.
//!
//! `std::fs::canonicalize` fails for paths that do not exist, which would
//! make a missing file inside the root indistinguishable from an escape.
//! [`soft_canonicalize`] resolves as much of the path as exists on disk and
//! normalizes the rest lexically.

use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Most symlinks followed while resolving one path, matching Linux's limit.
pub const MAX_SYMLINK_HOPS: usize = 40;

/// An owned path component still waiting to be resolved.
enum Part {
    Root(OsString),
    Parent,
    Normal(OsString),
}

fn parts(path: &Path) -> Vec<Part> {
    path.components()
        .filter_map(|component| match component {
            Component::Prefix(_) | Component::RootDir => {
                Some(Part::Root(component.as_os_str().to_os_string()))
            }
            Component::CurDir => None,
            Component::ParentDir => Some(Part::Parent),
            Component::Normal(part) => Some(Part::Normal(part.to_os_string())),
        })
        .collect()
}

/// Resolves `.`, `..` and symlinks without requiring the path to exist.
///
/// Components are processed left to right. After each normal component the
/// accumulated prefix is canonicalized if it exists, so symlinks are
/// followed before any later `..` is applied. A symlink whose target does
/// not exist is still followed: its target is spliced into the remaining
/// components, up to [`MAX_SYMLINK_HOPS`] times. Other components that do
/// not exist are kept verbatim. An absolute component resets the
/// accumulated path.
///
/// Relative inputs are anchored at the current working directory.
pub fn soft_canonicalize(path: &Path) -> PathBuf {
    let anchored;
    let path = if path.is_relative() {
        anchored = std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf());
        anchored.as_path()
    } else {
        path
    };

    // Stack of pending components, next one on top
    let mut pending: Vec<Part> = parts(path).into_iter().rev().collect();
    let mut resolved = PathBuf::new();
    let mut hops = 0;

    while let Some(part) = pending.pop() {
        match part {
            Part::Root(root) => resolved.push(root),
            Part::Parent => {
                resolved.pop();
            }
            Part::Normal(name) => {
                resolved.push(name);
                if let Ok(canonical) = fs::canonicalize(&resolved) {
                    resolved = canonical;
                    continue;
                }
                if hops >= MAX_SYMLINK_HOPS {
                    continue;
                }
                if let Some(target) = dangling_link_target(&resolved) {
                    hops += 1;
                    resolved.pop();
                    pending.extend(parts(&target).into_iter().rev());
                }
            }
        }
    }

    resolved
}

/// Target of `path` if it is a symlink that could not be canonicalized.
fn dangling_link_target(path: &Path) -> Option<PathBuf> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if !metadata.file_type().is_symlink() {
        return None;
    }
    fs::read_link(path).ok()
}

/// Expands a leading `~` to the current user's home directory.
///
/// Paths without a leading `~`, or hosts without a home directory, are
/// returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
