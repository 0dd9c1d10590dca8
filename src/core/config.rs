//! Persisted user preferences.
//!
//! The host editor owns persistence in general; this module gives it a ready-made JSON
//! store under the platform config directory and an in-memory store for hosts that keep
//! preferences elsewhere.

use crate::core::dirs::get_config_directory;
use crate::core::error::{Result, VcsOverlayError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Three-state answer remembered across sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RememberValue {
    Yes,
    No,
    #[default]
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether confirmed deletions of tracked files go through the backend.
    pub should_delete: RememberValue,
    /// Whether a commit is offered after a tracked file was moved.
    pub commit_after_move: RememberValue,
    /// Quiet period before a burst of filesystem events triggers a refresh.
    pub debounce_ms: u64,
    /// Watch the project directories recursively.
    pub watch_project: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            should_delete: RememberValue::Ask,
            commit_after_move: RememberValue::Ask,
            debounce_ms: 300,
            watch_project: true,
        }
    }
}

/// Load/save seam to the host's settings mechanism.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings kept as pretty JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/vcs-overlay/settings.json`
    pub fn in_config_directory() -> Result<Self> {
        Ok(Self::new(get_config_directory()?.join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::debug!(
                "No settings file at {}, using defaults",
                self.path.display()
            );
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| VcsOverlayError::settings_read_failed(&self.path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| VcsOverlayError::settings_parse_failed(&self.path, e))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| VcsOverlayError::settings_write_failed(parent, e))?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, content)
            .map_err(|e| VcsOverlayError::settings_write_failed(&self.path, e))?;

        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Volatile store, used by hosts with their own persistence and by tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    pub fn current(&self) -> Settings {
        self.settings.lock().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        Ok(self.current())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.settings.lock() = settings.clone();
        Ok(())
    }
}
