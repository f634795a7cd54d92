//! Path sandboxing for the devtools server.
//!
//! Every path that reaches the filesystem on behalf of a caller is produced
//! by [`PathGuard::resolve`]. The guard:
//! - joins the untrusted relative path onto the sandbox root
//! - resolves `.`, `..` and symlinks (see [`soft_canonicalize`])
//! - rejects anything outside the root
//! - rejects anything under a denied directory or matching a denied
//!   filename/extension (see [`DenyPolicy`])
//!
//! The checks always run in that order, so an escaping path is never
//! evaluated against the deny lists.

pub mod canonical;
pub mod error;
pub mod guard;
pub mod policy;

pub use canonical::{expand_tilde, soft_canonicalize};
pub use error::{SandboxError, SandboxResult};
pub use guard::{PathGuard, ResolvedPath};
pub use policy::DenyPolicy;
