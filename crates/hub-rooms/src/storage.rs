//! Versioned JSON settings store
//!
//! Each storable type persists as one JSON file under the settings
//! directory, wrapped with its key and format version. Saves are atomic:
//! written to a temp file, then renamed over the target.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Settings store errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch for {key}: expected {expected}, found {found}")]
    VersionMismatch {
        key: String,
        expected: u32,
        found: u32,
    },
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// On-disk wrapper for one settings blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsFile<T> {
    /// Format version of the wrapped data
    pub version: u32,
    /// Settings key (file identifier)
    pub key: String,
    /// The actual data
    pub data: T,
}

/// Types that persist through the settings store
pub trait Storable: Serialize + DeserializeOwned {
    /// Settings key for this type
    const KEY: &'static str;
    /// Current format version
    const VERSION: u32;
}

/// The settings store
///
/// One instance per process, created at startup and handed to each
/// component that persists state.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings_dir: PathBuf,
}

impl SettingsStore {
    /// Create a settings store rooted in the given config directory
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            settings_dir: config_dir.as_ref().join("settings"),
        }
    }

    /// The settings directory path
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.settings_dir.join(format!("{key}.json"))
    }

    /// Whether a settings key has been written
    pub fn exists(&self, key: &str) -> bool {
        self.file_path(key).exists()
    }

    /// Load a storable type
    ///
    /// Returns `None` if nothing has been saved under its key yet. A file
    /// written by a different format version is an error; there is no
    /// migration path.
    pub async fn load<T: Storable>(&self) -> SettingsResult<Option<T>> {
        let path = self.file_path(T::KEY);

        if !path.exists() {
            debug!(key = T::KEY, "No settings file");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let file: SettingsFile<T> = serde_json::from_str(&content)?;

        if file.version != T::VERSION {
            return Err(SettingsError::VersionMismatch {
                key: T::KEY.to_string(),
                expected: T::VERSION,
                found: file.version,
            });
        }

        debug!(key = T::KEY, version = file.version, "Loaded settings");
        Ok(Some(file.data))
    }

    /// Save a storable type, replacing any previous value atomically
    pub async fn save<T: Storable>(&self, data: &T) -> SettingsResult<()> {
        if !self.settings_dir.exists() {
            fs::create_dir_all(&self.settings_dir).await?;
        }

        let file = SettingsFile {
            version: T::VERSION,
            key: T::KEY.to_string(),
            data,
        };

        let path = self.file_path(T::KEY);
        let temp_path = self.settings_dir.join(format!("{}.json.tmp", T::KEY));

        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(key = T::KEY, "Saved settings");
        Ok(())
    }

    /// Delete a settings key
    pub async fn delete(&self, key: &str) -> SettingsResult<()> {
        let path = self.file_path(key);
        if path.exists() {
            fs::remove_file(&path).await?;
            debug!(key, "Deleted settings");
        }
        Ok(())
    }
}
