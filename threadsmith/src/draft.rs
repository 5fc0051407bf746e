//! Draft persistence: the text being worked on survives between runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Everything the user typed that is not configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub content_warning: String,
    #[serde(default)]
    pub reply_to_url: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.content_warning.trim().is_empty()
            && self.reply_to_url.trim().is_empty()
    }
}

/// Reads and writes the draft file.
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    /// Store under the platform's local data directory.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join("threadsmith"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(Self::new(dir))
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("draft.json")
    }

    /// Load the saved draft, or an empty one if nothing was saved yet.
    pub fn load(&self) -> Result<Draft> {
        let path = self.path();
        if !path.exists() {
            return Ok(Draft::default());
        }

        let file = File::open(&path).context("Failed to open draft file")?;
        let draft = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse draft {}", path.display()))?;
        Ok(draft)
    }

    /// Save `draft`, stamping its update time.
    pub fn save(&self, draft: &Draft) -> Result<Draft> {
        fs::create_dir_all(&self.dir)?;

        let mut draft = draft.clone();
        draft.updated_at = Some(Utc::now());

        let file = File::create(self.path()).context("Failed to create draft file")?;
        serde_json::to_writer_pretty(BufWriter::new(file), &draft)
            .context("Failed to write draft JSON")?;
        Ok(draft)
    }

    /// Forget the saved draft.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_draft() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path());
        let draft = store.load().unwrap();
        assert!(draft.is_empty());
        assert!(draft.updated_at.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path().join("nested"));
        let draft = Draft {
            text: "Hello thread".to_string(),
            content_warning: "meta".to_string(),
            reply_to_url: "https://a.social/@amy/1".to_string(),
            updated_at: None,
        };

        let saved = store.save(&draft).unwrap();
        assert!(saved.updated_at.is_some());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.text, "Hello thread");
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path());
        store
            .save(&Draft {
                text: "x".to_string(),
                ..Draft::default()
            })
            .unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_partial_json_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path());
        fs::write(store.path(), r#"{"text": "only text"}"#).unwrap();
        let draft = store.load().unwrap();
        assert_eq!(draft.text, "only text");
        assert!(draft.content_warning.is_empty());
    }
}
