use canto_ports::storage::{SettingsDto, StorageError, StoragePort};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "Canto";
const SETTINGS_FILE: &str = "settings.json";

/// Staff settings kept as pretty JSON under a base directory.
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// `<config_dir>/Canto`
    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        dirs_next::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| StorageError::Io("user config dir not found".to_string()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to working directory for settings");
            PathBuf::from(".")
        });
        Self { base_dir }
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no stored settings, using defaults");
            return Ok(SettingsDto::default());
        }
        read_json(&path)
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        let path = self.settings_path();
        write_json(&path, s)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let data = fs::read(path).map_err(|e| StorageError::Io(e.to_string()))?;
    serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
}

/// Writes a temp file beside `path`, then renames it over `path`.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
    }
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).map_err(|e| StorageError::Io(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::Io(e.to_string()))
}
