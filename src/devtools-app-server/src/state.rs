//! Application state shared across request handlers.

use std::sync::Arc;

use anyhow::Context;
use devtools_files::{DirectoryLister, RangeReader, TreeSearcher};
use devtools_sandbox::PathGuard;

use crate::auth::RequestAuthenticator;
use crate::config::ServerConfig;

/// Immutable per-process state; nothing here is mutated after startup.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Sandbox guard shared by every file component.
    pub guard: Arc<PathGuard>,
    pub lister: DirectoryLister,
    pub reader: RangeReader,
    pub searcher: TreeSearcher,
    pub authenticator: RequestAuthenticator,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("root", &self.guard.root())
            .field("authenticator", &self.authenticator)
            .finish()
    }
}

impl AppState {
    /// Builds the state, validating the sandbox root.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let guard = PathGuard::new(&config.root, config.deny.to_policy())
            .with_context(|| format!("invalid sandbox root {}", config.root.display()))?;
        let guard = Arc::new(guard);

        Ok(Self {
            lister: DirectoryLister::new(Arc::clone(&guard)),
            reader: RangeReader::new(Arc::clone(&guard)),
            searcher: TreeSearcher::new(Arc::clone(&guard)),
            authenticator: RequestAuthenticator::new(config.auth.api_key.clone()),
            guard,
            config,
        })
    }
}
