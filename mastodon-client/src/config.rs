use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MastodonError, Result};

/// Stored login for one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Normalized instance host (e.g. `mastodon.social`)
    pub instance: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub access_token: String,
}

/// App registration waiting for the user to paste an authorization code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuth {
    pub instance: String,
    pub client_id: String,
    pub client_secret: String,
    pub code_verifier: String,
}

/// Contents of the credentials file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingAuth>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Load from `path`, returning an empty config if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| MastodonError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/threadsmith/mastodon.toml"))
    }

    /// Credentials, or an error telling the user to log in
    pub fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or(MastodonError::MissingCredentials)
    }
}

/// Reduce user input like `https://Mastodon.Social/` to `mastodon.social`
pub fn normalize_instance(instance: &str) -> String {
    let lowered = instance.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    without_scheme.trim_end_matches('/').to_string()
}

/// Base URL for API calls against `instance`
pub fn instance_url(instance: &str) -> String {
    format!("https://{}", normalize_instance(instance))
}
