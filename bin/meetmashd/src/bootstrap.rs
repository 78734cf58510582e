//! Bootstrap — startup sanity checks on the loaded configuration.
//!
//! The server refuses to start with an unusable config rather than
//! limp along with credentials that never match.

use crate::config::ServerConfig;

/// Minimum length for the per-user reader key. Short keys are too easy
/// to brute-force for a credential that grants read access to every
/// user's meeting list.
pub const MIN_USER_READER_KEY_LEN: usize = 32;

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.session.secret.is_empty() {
        anyhow::bail!("session secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("storage data_dir is empty in configuration.");
    }
    if config.keys.orchestrator.is_empty() {
        anyhow::bail!("orchestrator API key is empty in configuration.");
    }
    if config.keys.user_reader.len() < MIN_USER_READER_KEY_LEN {
        anyhow::bail!(
            "user_reader API key must be at least {} bytes.",
            MIN_USER_READER_KEY_LEN
        );
    }
    if config.keys.orchestrator == config.keys.user_reader {
        anyhow::bail!("orchestrator and user_reader API keys must differ.");
    }
    if config.orchestrator.base_url.is_empty() {
        anyhow::bail!("orchestrator base_url is empty in configuration.");
    }
    Ok(())
}
