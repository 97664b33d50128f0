//! Catalog commands.
//!
//! Thin wrappers around `CatalogState`, one per frontend call. Each maps store errors to
//! the serializable `CommandError` and logs failures by operation name only, never the
//! payload.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{
    CatalogEntry, CatalogEntryInput, CatalogEntryUpdate, CatalogError, CatalogState, FileInfo, SearchCriteria,
    Stats, probe,
};
use crate::config::CatalogConfig;

/// Error returned to the frontend, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommandError {
    DuplicateEntry { message: String },
    EntryNotFound { message: String },
    EntryInvalid { message: String },
    NotInitialized { message: String },
    StorageFailure { message: String },
    InvalidRequest { message: String },
}

impl CommandError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        CommandError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::DuplicateEntry { message }
            | CommandError::EntryNotFound { message }
            | CommandError::EntryInvalid { message }
            | CommandError::NotInitialized { message }
            | CommandError::StorageFailure { message }
            | CommandError::InvalidRequest { message } => message,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CommandError {}

impl From<CatalogError> for CommandError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::DuplicateEntry { .. } => CommandError::DuplicateEntry { message },
            CatalogError::EntryNotFound { .. } => CommandError::EntryNotFound { message },
            CatalogError::EntryInvalid { .. } => CommandError::EntryInvalid { message },
            CatalogError::NotInitialized => CommandError::NotInitialized { message },
            CatalogError::Sqlite(_) | CatalogError::Io(_) | CatalogError::TaskFailed(_) => {
                CommandError::StorageFailure { message }
            }
        }
    }
}

/// Convert a store result, logging the failure under `operation`.
fn finish<T>(operation: &str, result: Result<T, CatalogError>) -> Result<T, CommandError> {
    result.map_err(|err| {
        if err.is_storage_failure() {
            log::error!("Catalog command {operation} failed: {err}");
        } else {
            log::warn!("Catalog command {operation} rejected: {err}");
        }
        CommandError::from(err)
    })
}

async fn run_blocking<T, F>(f: F) -> Result<T, CatalogError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CatalogError::TaskFailed(e.to_string()))
}

/// Open the catalog database named by `config`.
pub async fn initialize(state: &CatalogState, config: &CatalogConfig) -> Result<(), CommandError> {
    finish("initialize", state.initialize(config.db_path.clone()).await)
}

/// Catalog a path. The path must exist on disk and not be cataloged yet.
pub async fn add_file(state: &CatalogState, entry: CatalogEntryInput) -> Result<i64, CommandError> {
    let result = async {
        let path = entry.path.clone();
        let on_disk = run_blocking({
            let path = path.clone();
            move || Path::new(&path).exists()
        })
        .await?;
        if !on_disk {
            return Err(CatalogError::EntryNotFound { path });
        }
        state.insert(entry).await
    }
    .await;
    finish("add_file", result)
}

/// Returns the number of entries updated, 0 for an unknown id.
pub async fn update_file(state: &CatalogState, id: i64, patch: CatalogEntryUpdate) -> Result<usize, CommandError> {
    finish("update_file", state.update(id, patch).await)
}

/// Returns the number of entries removed, 0 for an unknown id.
pub async fn delete_file(state: &CatalogState, id: i64) -> Result<usize, CommandError> {
    finish("delete_file", state.delete(id).await)
}

pub async fn search_files(state: &CatalogState, criteria: SearchCriteria) -> Result<Vec<CatalogEntry>, CommandError> {
    finish("search_files", state.search(criteria).await)
}

pub async fn get_stats(state: &CatalogState) -> Result<Stats, CommandError> {
    finish("get_stats", state.statistics().await)
}

pub async fn get_all_categories(state: &CatalogState) -> Result<Vec<String>, CommandError> {
    finish("get_all_categories", state.list_categories().await)
}

pub async fn get_all_tags(state: &CatalogState) -> Result<Vec<String>, CommandError> {
    finish("get_all_tags", state.list_tags().await)
}

/// Whether `path` exists on disk. Doesn't consult the catalog.
pub async fn check_file_exists(path: String) -> Result<bool, CommandError> {
    finish(
        "check_file_exists",
        run_blocking(move || Path::new(&path).exists()).await,
    )
}

/// Whether `path` is already cataloged. Doesn't consult the filesystem.
pub async fn is_file_cataloged(state: &CatalogState, path: String) -> Result<bool, CommandError> {
    finish("is_file_cataloged", state.exists(path).await)
}

/// Filesystem metadata for `path`, or `None` if nothing is there.
pub async fn get_file_info(path: String) -> Result<Option<FileInfo>, CommandError> {
    let result = run_blocking(move || match probe(&PathBuf::from(path)) {
        Ok(info) => Ok(Some(info)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CatalogError::Io(e)),
    })
    .await
    .and_then(|inner| inner);
    finish("get_file_info", result)
}
