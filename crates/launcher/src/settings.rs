//! Launcher settings persistence.
//!
//! The same `settings.json` the desktop shell reads: the selected
//! directory set, the online-games toggle, and display preferences that
//! ride along as plain data.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Default file and directory locations, relative to the launcher's
/// working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_LEDGER_FILE: &str = "game_tracker.json";
pub const DEFAULT_ONLINE_DIR: &str = "Online Games";
pub const DEFAULT_COVERS_DIR: &str = "photos";

/// Persisted launcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LauncherSettings {
    /// Ordered directory set the scanner walks; earlier entries win
    /// dedup ties.
    #[serde(default)]
    pub selected_directories: Vec<String>,

    #[serde(default)]
    pub show_online_games: bool,

    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default = "default_display_style")]
    pub display_style: String,
}

fn default_display_style() -> String {
    "grid".into()
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            selected_directories: Vec::new(),
            show_online_games: false,
            dark_mode: false,
            display_style: default_display_style(),
        }
    }
}

impl LauncherSettings {
    /// Loads settings from disk. An absent or unparseable file falls back
    /// to defaults (logged), never an error.
    pub fn load(path: &Path) -> LauncherSettings {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return LauncherSettings::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read settings, using defaults"
                );
                return LauncherSettings::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse settings, using defaults"
                );
                LauncherSettings::default()
            }
        }
    }

    /// Saves settings as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ServiceError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Appends a directory unless it is already present.
    pub fn add_directory(&mut self, dir: impl Into<String>) {
        let dir = dir.into();
        if !self.selected_directories.contains(&dir) {
            self.selected_directories.push(dir);
        }
    }

    /// Removes a directory; unknown paths are ignored.
    pub fn remove_directory(&mut self, dir: &str) {
        self.selected_directories.retain(|d| d != dir);
    }

    /// The directory set as scanner input paths, in order.
    pub fn directories(&self) -> Vec<PathBuf> {
        self.selected_directories.iter().map(PathBuf::from).collect()
    }
}
