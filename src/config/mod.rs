// src/config/mod.rs
//! Persisted configuration: audio settings and the last-played source.
//!
//! Plain JSON files under the user config directory. Missing files load
//! as defaults so a fresh install needs no setup step; corrupt files are
//! reported as settings errors and get replaced on the next save.

use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::AudioSettings;
use crate::error::{PlayerError, Result};

const APP_DIR: &str = "tremolo";
const SETTINGS_FILE: &str = "audio-settings.json";
const BROADCAST_FILE: &str = "broadcast.json";

/// Key/value store rooted at one directory. Cloneable; every load/save
/// goes straight to disk so concurrent instances see last-write-wins.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Open the store under the platform config directory.
    pub fn open_default() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| PlayerError::Settings("no config directory on this platform".into()))?;
        Self::open_at(base.join(APP_DIR))
    }

    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open_at(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            PlayerError::Settings(format!("could not create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load persisted audio settings; a missing or empty file yields
    /// defaults.
    pub fn load_settings(&self) -> Result<AudioSettings> {
        let path = self.dir.join(SETTINGS_FILE);
        match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Ok(AudioSettings::default()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                PlayerError::Settings(format!("could not parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AudioSettings::default()),
            Err(e) => Err(PlayerError::Settings(format!(
                "could not read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn save_settings(&self, settings: &AudioSettings) -> Result<()> {
        let path = self.dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| PlayerError::Settings(format!("could not encode settings: {}", e)))?;
        fs::write(&path, json).map_err(|e| {
            PlayerError::Settings(format!("could not write {}: {}", path.display(), e))
        })
    }

    /// The last-played source string, if one was persisted.
    pub fn load_broadcast(&self) -> Result<Option<String>> {
        let path = self.dir.join(BROADCAST_FILE);
        match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
                PlayerError::Settings(format!("could not parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PlayerError::Settings(format!(
                "could not read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn save_broadcast(&self, source: &str) -> Result<()> {
        let path = self.dir.join(BROADCAST_FILE);
        let json = serde_json::to_string(source)
            .map_err(|e| PlayerError::Settings(format!("could not encode source: {}", e)))?;
        fs::write(&path, json).map_err(|e| {
            PlayerError::Settings(format!("could not write {}: {}", path.display(), e))
        })
    }
}
