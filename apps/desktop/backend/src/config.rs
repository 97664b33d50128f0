//! Backend configuration.

use std::env;
use std::path::{Path, PathBuf};

use crate::catalog::default_db_path;
use crate::settings::Settings;

const DB_PATH_VAR: &str = "FILECAT_DB_PATH";
const LOG_LEVEL_VAR: &str = "FILECAT_LOG_LEVEL";

/// Where the catalog lives and how loudly to log.
/// Priority: environment variables > user settings > defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub db_path: PathBuf,
    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl CatalogConfig {
    /// Load configuration with priority: env vars > user settings > defaults.
    pub fn from_settings_and_env(settings: &Settings) -> Self {
        Self::resolve(
            env::var(DB_PATH_VAR).ok(),
            env::var(LOG_LEVEL_VAR).ok(),
            settings,
            &data_dir(),
        )
    }

    fn resolve(env_db_path: Option<String>, env_log_level: Option<String>, settings: &Settings, data_dir: &Path) -> Self {
        // 1. FILECAT_DB_PATH, 2. databasePath setting, 3. <data dir>/filecat/database.sqlite
        let db_path = env_db_path
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| settings.database_path.clone())
            .unwrap_or_else(|| default_db_path(data_dir));

        // 1. FILECAT_LOG_LEVEL, 2. verboseLogging setting, 3. info
        let log_level = env_log_level
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| (if settings.verbose_logging { "debug" } else { "info" }).to_string());

        Self { db_path, log_level }
    }
}

/// The platform's per-user data directory, or the working directory if there is none.
pub fn data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}
