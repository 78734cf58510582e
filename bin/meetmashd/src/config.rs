//! Server configuration — TOML file resolved by context name or path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub keys: KeysConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// HS256 secret for session tokens.
    pub secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

fn default_expire_secs() -> u64 {
    86_400
}

/// Machine credentials for the two non-session API scopes.
#[derive(Debug, Clone, Deserialize)]
pub struct KeysConfig {
    /// Grants the service-wide meeting listing.
    pub orchestrator: String,
    /// Grants the per-user meeting listing. Must be at least 32 bytes.
    pub user_reader: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Base URL of the external bot orchestrator, e.g. `http://bots:9090`.
    pub base_url: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// Anything containing `/` or `.` is treated as a literal path;
    /// a bare name resolves to `/etc/meetmash/<name>.toml`.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/meetmash/{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?;
        Ok(config)
    }
}
