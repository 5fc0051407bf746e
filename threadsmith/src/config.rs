//! threadsmith configuration management.

use anyhow::Result;
use mastodon_client::Visibility;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thread_splitter::{DEFAULT_CHAR_LIMIT, SplitOptions, parse_char_limit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadsmithConfig {
    /// Maximum characters per post on your instance
    #[serde(default = "default_char_limit", deserialize_with = "lenient_char_limit")]
    pub char_limit: usize,

    /// Append 🧵i/n to each post
    #[serde(default = "default_true")]
    pub pagination: bool,

    /// Prefer breaking at sentence ends
    #[serde(default = "default_true")]
    pub sentence_endings: bool,

    /// Repeat the first post's mentions on every reply
    #[serde(default)]
    pub include_mentions: bool,

    /// Default visibility for posted threads
    #[serde(default)]
    pub visibility: Visibility,
}

fn default_char_limit() -> usize {
    DEFAULT_CHAR_LIMIT
}

fn default_true() -> bool {
    true
}

/// A hand-edited `char_limit = "lots"` or `-1` falls back to the default
/// instead of making the whole file unreadable.
fn lenient_char_limit<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(match value {
        toml::Value::Integer(n) if n > 0 => n as usize,
        toml::Value::String(s) => parse_char_limit(&s),
        _ => DEFAULT_CHAR_LIMIT,
    })
}

impl Default for ThreadsmithConfig {
    fn default() -> Self {
        Self {
            char_limit: default_char_limit(),
            pagination: true,
            sentence_endings: true,
            include_mentions: false,
            visibility: Visibility::default(),
        }
    }
}

impl ThreadsmithConfig {
    /// Get the config file path: ~/.config/threadsmith/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("threadsmith")
            .join("config.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: ThreadsmithConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Snapshot of the splitting options for one planning pass.
    pub fn split_options(&self, content_warning: &str) -> SplitOptions {
        SplitOptions {
            char_limit: self.char_limit,
            pagination: self.pagination,
            sentence_endings: self.sentence_endings,
            // Direct messages only reach people mentioned in every post
            include_mentions: self.include_mentions || self.visibility == Visibility::Direct,
            content_warning: content_warning.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ThreadsmithConfig::default();
        assert_eq!(config.char_limit, 500);
        assert!(config.pagination);
        assert!(config.sentence_endings);
        assert!(!config.include_mentions);
        assert_eq!(config.visibility, Visibility::Public);
    }

    #[test]
    fn test_config_path() {
        let path = ThreadsmithConfig::config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.ends_with("threadsmith/config.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
char_limit = 1000
pagination = false
sentence_endings = false
include_mentions = true
visibility = "unlisted"
"#;
        let config: ThreadsmithConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.char_limit, 1000);
        assert!(!config.pagination);
        assert!(!config.sentence_endings);
        assert!(config.include_mentions);
        assert_eq!(config.visibility, Visibility::Unlisted);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: ThreadsmithConfig = toml::from_str("").unwrap();
        assert_eq!(config, ThreadsmithConfig::default());
    }

    #[test]
    fn test_bad_char_limit_falls_back() {
        let config: ThreadsmithConfig = toml::from_str("char_limit = \"lots\"").unwrap();
        assert_eq!(config.char_limit, 500);

        let config: ThreadsmithConfig = toml::from_str("char_limit = -20").unwrap();
        assert_eq!(config.char_limit, 500);

        let config: ThreadsmithConfig = toml::from_str("char_limit = \"280\"").unwrap();
        assert_eq!(config.char_limit, 280);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = ThreadsmithConfig {
            char_limit: 280,
            visibility: Visibility::Private,
            ..ThreadsmithConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(ThreadsmithConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_direct_visibility_enables_mentions() {
        let config = ThreadsmithConfig {
            visibility: Visibility::Direct,
            ..ThreadsmithConfig::default()
        };
        let options = config.split_options("  cw  ");
        assert!(options.include_mentions);
        assert_eq!(options.content_warning, "cw");
    }
}
