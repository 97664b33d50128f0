//! File catalog.
//!
//! Keeps a personal record of files and directories the user chose to catalog, with
//! categories, tags, and descriptions, in a single SQLite database. Searching never
//! touches the filesystem; only adding a path does.

pub mod probe;
pub mod query;
pub mod store;
pub mod tags;
pub mod types;


use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::ignore_poison::IgnorePoison;

pub use probe::{FileInfo, probe};
pub use query::{SearchFilter, build_filter};
pub use store::{CatalogError, CatalogStore, RECENT_FILES_LIMIT};
pub use tags::TagsInput;
pub use types::{CatalogEntry, CatalogEntryInput, CatalogEntryUpdate, SearchCriteria, Stats};

/// Shared handle to the store, cheap to clone.
///
/// Uses `std::sync::Mutex` (not `RwLock`) because `CatalogStore` holds a
/// `rusqlite::Connection`, which is `Send` but not `Sync`. Every operation runs on
/// the blocking pool so the async runtime never waits on SQLite.
#[derive(Clone, Default)]
pub struct CatalogState {
    inner: Arc<Mutex<Option<CatalogStore>>>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the database at `db_path` and make it the active store.
    ///
    /// Replaces any store opened before. On failure the previous store stays active.
    pub async fn initialize(&self, db_path: PathBuf) -> Result<(), CatalogError> {
        let (store, entries) = tokio::task::spawn_blocking(move || {
            let store = CatalogStore::open(&db_path)?;
            let entries = store.count()?;
            Ok::<_, CatalogError>((store, entries))
        })
        .await
        .map_err(|e| CatalogError::TaskFailed(e.to_string()))??;
        log::info!("Catalog ready at {} ({entries} entries)", store.db_path().display());
        *self.inner.lock_ignore_poison() = Some(store);
        Ok(())
    }

    /// Drop the active store, closing the connection.
    pub fn close(&self) {
        if self.inner.lock_ignore_poison().take().is_some() {
            log::info!("Catalog closed");
        }
    }

    /// Run `f` against the store on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, CatalogError>
    where
        T: Send + 'static,
        F: FnOnce(&CatalogStore) -> Result<T, CatalogError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let guard = inner.lock_ignore_poison();
            match guard.as_ref() {
                Some(store) => f(store),
                None => Err(CatalogError::NotInitialized),
            }
        })
        .await
        .map_err(|e| CatalogError::TaskFailed(e.to_string()))?
    }

    pub async fn exists(&self, path: String) -> Result<bool, CatalogError> {
        self.run(move |store| store.exists(&path)).await
    }

    pub async fn insert(&self, input: CatalogEntryInput) -> Result<i64, CatalogError> {
        self.run(move |store| store.insert(input)).await
    }

    pub async fn update(&self, id: i64, patch: CatalogEntryUpdate) -> Result<usize, CatalogError> {
        self.run(move |store| store.update(id, patch)).await
    }

    pub async fn delete(&self, id: i64) -> Result<usize, CatalogError> {
        self.run(move |store| store.delete(id)).await
    }

    pub async fn search(&self, criteria: SearchCriteria) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.run(move |store| store.search(&criteria)).await
    }

    pub async fn statistics(&self) -> Result<Stats, CatalogError> {
        self.run(|store| store.statistics()).await
    }

    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.run(|store| store.list_categories()).await
    }

    pub async fn list_tags(&self) -> Result<Vec<String>, CatalogError> {
        self.run(|store| store.list_tags()).await
    }
}

/// Default database location: `<data dir>/filecat/database.sqlite`.
pub fn default_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("filecat").join("database.sqlite")
}
