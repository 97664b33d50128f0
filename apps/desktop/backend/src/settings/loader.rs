//! Settings loading from the JSON file the desktop frontend writes.
//!
//! Only the keys the backend needs are read. Unknown keys are ignored, and a missing
//! or unparsable file yields defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Backend-relevant user settings.
/// Uses serde aliases to accept both camelCase (written by the frontend) and snake_case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Overrides the default catalog location
    #[serde(alias = "databasePath", default)]
    pub database_path: Option<PathBuf>,
    #[serde(alias = "verboseLogging", default)]
    pub verbose_logging: bool,
}

/// Location of the settings file under `data_dir`.
pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("filecat").join("settings.json")
}

/// Load settings from `<data_dir>/filecat/settings.json`.
/// Returns defaults if the file doesn't exist or can't be parsed.
pub fn load_settings(data_dir: &Path) -> Settings {
    let path = settings_path(data_dir);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => return Settings::default(),
    };
    match serde_json::from_str(&contents) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        }
    }
}
