//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use devtools_sandbox::{DenyPolicy, expand_tilde};
use devtools_sandbox::policy::{DEFAULT_DENY_DIRS, DEFAULT_DENY_EXTENSIONS, DEFAULT_DENY_FILENAMES};
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_API_KEY_HEADER;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:8787").
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Sandbox root; every exposed path lives under it.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Deny rules layered on top of the sandbox root.
    #[serde(default)]
    pub deny: DenyConfig,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// CORS origins (empty = allow all).
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_root() -> PathBuf {
    expand_tilde("~/dev")
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_body_size() -> usize {
    64 * 1024
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            root: default_root(),
            auth: AuthConfig::default(),
            deny: DenyConfig::default(),
            request_timeout: default_request_timeout(),
            max_body_size: default_max_body_size(),
            cors_origins: vec![],
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("DEVTOOLS_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(root) = lookup("DEVTOOLS_ROOT") {
            config.root = expand_tilde(&root);
        }

        if let Some(key) = lookup("DEVTOOLS_API_KEY") {
            config.auth.api_key = Some(key);
        }

        if let Some(header) = lookup("DEVTOOLS_API_KEY_HEADER") {
            config.auth.header = header;
        }

        if let Some(timeout) = lookup("DEVTOOLS_REQUEST_TIMEOUT") {
            config.request_timeout = timeout.parse()?;
        }

        Ok(config)
    }

    /// Get request timeout as Duration.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Authentication configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret. `None` or empty means data endpoints answer 500.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Header carrying the presented key.
    #[serde(default = "default_api_key_header")]
    pub header: String,
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            header: default_api_key_header(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("header", &self.header)
            .finish()
    }
}

/// Deny rule lists, as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenyConfig {
    /// Denied directory prefixes; `~` is expanded.
    #[serde(default = "default_deny_dirs")]
    pub dirs: Vec<String>,
    /// Denied exact filenames.
    #[serde(default = "default_deny_filenames")]
    pub filenames: Vec<String>,
    /// Denied extensions, matched case-insensitively.
    #[serde(default = "default_deny_extensions")]
    pub extensions: Vec<String>,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_deny_dirs() -> Vec<String> {
    to_strings(DEFAULT_DENY_DIRS)
}

fn default_deny_filenames() -> Vec<String> {
    to_strings(DEFAULT_DENY_FILENAMES)
}

fn default_deny_extensions() -> Vec<String> {
    to_strings(DEFAULT_DENY_EXTENSIONS)
}

impl Default for DenyConfig {
    fn default() -> Self {
        Self {
            dirs: default_deny_dirs(),
            filenames: default_deny_filenames(),
            extensions: default_deny_extensions(),
        }
    }
}

impl DenyConfig {
    /// Builds the runtime policy, canonicalizing directory prefixes.
    pub fn to_policy(&self) -> DenyPolicy {
        DenyPolicy::new(
            self.dirs.iter(),
            self.filenames.iter().cloned(),
            self.extensions.iter(),
        )
    }
}
