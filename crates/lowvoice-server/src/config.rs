//! Server configuration.

use lowvoice_core::VaultConfig;

use crate::profile::DEFAULT_PROFILE_BASE;

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Gateway address to bind to (e.g., "127.0.0.1:7070")
    pub bind_address: String,
    /// Bot's own handle, used in usage hints and deep links
    pub bot_username: String,
    /// Base URL for public profile pages
    pub profile_base_url: String,
    /// Whisper TTL and resolver cache size
    pub vault: VaultConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7070".to_string(),
            bot_username: "LowVoiceBot".to_string(),
            profile_base_url: DEFAULT_PROFILE_BASE.to_string(),
            vault: VaultConfig::default(),
        }
    }
}
