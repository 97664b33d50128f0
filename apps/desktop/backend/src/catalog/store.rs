//! SQLite store for the file catalog.
//!
//! One DB file, one `files` table, WAL mode. Column names match databases created by
//! the earlier desktop app, so existing catalogs open unchanged. This module owns the
//! schema, the uniqueness rule on `file_path`, and every read and write query.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params, params_from_iter};

use super::query::{ADDED_TIME_FORMAT, SearchFilter, build_filter};
use super::tags::{decode_tags, decode_tags_lossy, encode_tags, normalize_tags};
use super::types::{CatalogEntry, CatalogEntryInput, CatalogEntryUpdate, SearchCriteria, Stats, non_blank};

const SCHEMA_VERSION: i64 = 1;

/// How many entries `statistics()` returns as recent files.
pub const RECENT_FILES_LIMIT: i64 = 10;

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CatalogError {
    /// An entry with this path is already cataloged.
    DuplicateEntry { path: String },
    /// The path doesn't exist on disk.
    EntryNotFound { path: String },
    /// The payload failed boundary validation.
    EntryInvalid { reason: String },
    /// A call arrived before the store was initialized.
    NotInitialized,
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    /// The blocking task running the query panicked or was cancelled.
    TaskFailed(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Sqlite(err)
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Paths stay out of messages; they end up in logs
            CatalogError::DuplicateEntry { .. } => write!(f, "This file is already in the catalog"),
            CatalogError::EntryNotFound { .. } => write!(f, "File doesn't exist or has been moved"),
            CatalogError::EntryInvalid { reason } => write!(f, "Invalid entry: {reason}"),
            CatalogError::NotInitialized => write!(f, "Catalog not initialized"),
            CatalogError::Sqlite(e) => write!(f, "SQLite error: {e}"),
            CatalogError::Io(e) => write!(f, "I/O error: {e}"),
            CatalogError::TaskFailed(e) => write!(f, "Task failed: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl CatalogError {
    /// Whether this is a lower-level failure rather than a classified, user-correctable one.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            CatalogError::Sqlite(_) | CatalogError::Io(_) | CatalogError::TaskFailed(_)
        )
    }
}

/// Reclassify a write error: a UNIQUE violation on `file_path` means a duplicate entry.
///
/// The pre-write `exists` check can miss a concurrent insert; the constraint cannot.
fn classify_write_error(err: rusqlite::Error, path: &str) -> CatalogError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            CatalogError::DuplicateEntry { path: path.to_string() }
        }
        _ => CatalogError::Sqlite(err),
    }
}

// ── Schema ───────────────────────────────────────────────────────────

const CREATE_TABLES_SQL: &str = "
    CREATE TABLE IF NOT EXISTS files (
        file_id           INTEGER PRIMARY KEY AUTOINCREMENT,
        file_name         TEXT NOT NULL,
        file_ext          TEXT,
        file_cat          TEXT,
        file_tags         TEXT,
        file_desc         TEXT,
        file_created_time DATETIME,
        file_updated_time DATETIME,
        file_path         TEXT NOT NULL UNIQUE,
        is_directory      BOOLEAN DEFAULT 0,
        added_time        DATETIME DEFAULT CURRENT_TIMESTAMP
    );
";

const ENTRY_COLUMNS: &str = "file_id, file_name, file_ext, file_cat, file_tags, file_desc,
     file_created_time, file_updated_time, file_path, is_directory, added_time";

/// Apply WAL-mode pragmas. The busy timeout covers another process holding the file briefly.
fn apply_pragmas(conn: &Connection) -> Result<(), CatalogError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

/// Create the table if missing and stamp the schema version on a fresh file.
///
/// Never drops or rewrites data. An unknown version is logged and left alone.
fn create_tables(conn: &Connection) -> Result<(), CatalogError> {
    conn.execute_batch(CREATE_TABLES_SQL)?;
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    match version {
        0 => conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?,
        SCHEMA_VERSION => {}
        other => log::warn!("Catalog schema version {other} is newer than {SCHEMA_VERSION}, opening anyway"),
    }
    Ok(())
}

// ── Row mapping ──────────────────────────────────────────────────────

/// Map a row selected with `ENTRY_COLUMNS` to an entry, decoding tags softly.
fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
    let tags: Option<String> = row.get(4)?;
    Ok(CatalogEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        extension: row.get(2)?,
        category: row.get(3)?,
        tags: decode_tags_lossy(tags.as_deref()),
        description: row.get(5)?,
        created_time: lenient_timestamp(row.get(6)?),
        updated_time: lenient_timestamp(row.get(7)?),
        path: row.get(8)?,
        is_directory: row.get::<_, Option<i64>>(9)?.unwrap_or(0) != 0,
        added_time: row.get(10)?,
    })
}

/// Parse a filesystem timestamp column. These come from callers verbatim, so a value
/// in an unexpected format reads as absent instead of failing the whole query.
fn lenient_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f") {
        Ok(dt) => Some(dt.and_utc()),
        Err(_) => {
            log::debug!("Unparseable timestamp in catalog: {raw}");
            None
        }
    }
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn format_added_time(dt: &NaiveDateTime) -> String {
    dt.trunc_subsecs(0).format(ADDED_TIME_FORMAT).to_string()
}

// ── CatalogStore ─────────────────────────────────────────────────────

/// Handle to the catalog database.
///
/// Holds the single connection. Not `Sync`; share it through `CatalogState`.
pub struct CatalogStore {
    db_path: PathBuf,
    conn: Connection,
}

impl CatalogStore {
    /// Open (or create) the catalog at `db_path`.
    ///
    /// Creates parent directories, applies pragmas, and creates the table if missing.
    /// Idempotent: reopening an existing catalog keeps its data.
    pub fn open(db_path: &Path) -> Result<Self, CatalogError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        apply_pragmas(&conn)?;
        create_tables(&conn)?;
        log::info!("Catalog opened at {}", db_path.display());
        Ok(Self {
            db_path: db_path.to_path_buf(),
            conn,
        })
    }

    /// Return the path to the DB file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Whether an entry with exactly this path is cataloged.
    pub fn exists(&self, path: &str) -> Result<bool, CatalogError> {
        let mut stmt = self.conn.prepare_cached("SELECT 1 FROM files WHERE file_path = ?1")?;
        Ok(stmt.exists(params![path])?)
    }

    /// Look up a single entry by id.
    pub fn get(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {ENTRY_COLUMNS} FROM files WHERE file_id = ?1"))?;
        let entry = stmt.query_row(params![id], entry_from_row).optional()?;
        Ok(entry)
    }

    /// Run a prebuilt filter over all rows, in insertion order.
    pub fn query(&self, filter: &SearchFilter) -> Result<Vec<CatalogEntry>, CatalogError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM files WHERE {} ORDER BY file_id",
            filter.clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filter.params().iter()), entry_from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            let entry = row?;
            if filter.matches_tags(&entry.tags) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Build a filter from `criteria` and run it. Empty criteria return nothing.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<CatalogEntry>, CatalogError> {
        match build_filter(criteria) {
            Some(filter) => self.query(&filter),
            None => Ok(Vec::new()),
        }
    }

    /// Compute counts, extension distribution, and recent entries as of now.
    pub fn statistics(&self) -> Result<Stats, CatalogError> {
        let (file_count, dir_count) = self.conn.query_row(
            "SELECT
                 COALESCE(SUM(CASE WHEN is_directory = 0 THEN 1 ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN is_directory = 1 THEN 1 ELSE 0 END), 0)
             FROM files",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        let mut stmt = self.conn.prepare_cached(
            "SELECT COALESCE(file_ext, ''), COUNT(*)
             FROM files WHERE is_directory = 0
             GROUP BY COALESCE(file_ext, '')",
        )?;
        let file_types = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {ENTRY_COLUMNS} FROM files ORDER BY added_time DESC, file_id DESC LIMIT ?1"
        ))?;
        let recent_files = stmt
            .query_map(params![RECENT_FILES_LIMIT], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Stats {
            file_count: file_count as u64,
            dir_count: dir_count as u64,
            file_types,
            recent_files,
        })
    }

    /// Distinct non-empty categories, sorted.
    pub fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT file_cat FROM files
             WHERE file_cat IS NOT NULL AND file_cat != ''
             ORDER BY file_cat",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Union of all tags across entries, sorted. Rows with unreadable tags are skipped.
    pub fn list_tags(&self) -> Result<Vec<String>, CatalogError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT file_id, file_tags FROM files
             WHERE file_tags IS NOT NULL AND file_tags != ''",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        let mut tags = BTreeSet::new();
        for row in rows {
            let (id, encoded) = row?;
            match decode_tags(&encoded) {
                Ok(decoded) => tags.extend(decoded.into_iter().filter(|t| !t.is_empty())),
                Err(e) => log::warn!("Skipping tags of entry {id}: {e}"),
            }
        }
        Ok(tags.into_iter().collect())
    }

    /// Total number of entries.
    pub fn count(&self) -> Result<u64, CatalogError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert a new entry and return its id.
    ///
    /// Fails with `DuplicateEntry` if the path is already cataloged, whether caught by the
    /// pre-check or by the UNIQUE constraint at write time.
    pub fn insert(&self, input: CatalogEntryInput) -> Result<i64, CatalogError> {
        let input = input.validate().map_err(|reason| CatalogError::EntryInvalid { reason })?;

        if self.exists(&input.path)? {
            return Err(CatalogError::DuplicateEntry { path: input.path });
        }

        let tags = encode_tags(&normalize_tags(&input.tags));
        let added_time = input.added_time.unwrap_or_else(|| Utc::now().naive_utc());

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO files (
                 file_name, file_ext, file_cat, file_tags, file_desc,
                 file_created_time, file_updated_time, file_path, is_directory, added_time
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        stmt.execute(params![
            input.name,
            input.extension,
            input.category,
            tags,
            input.description,
            input.created_time.as_ref().map(format_timestamp),
            input.updated_time.as_ref().map(format_timestamp),
            input.path,
            input.is_directory as i32,
            format_added_time(&added_time),
        ])
        .map_err(|e| classify_write_error(e, &input.path))?;

        let id = self.conn.last_insert_rowid();
        log::debug!("Cataloged entry {id}");
        Ok(id)
    }

    /// Apply a partial update. Returns the number of rows updated (0 if the id is unknown).
    ///
    /// Changing the path re-checks uniqueness against the other entries.
    pub fn update(&self, id: i64, patch: CatalogEntryUpdate) -> Result<usize, CatalogError> {
        patch.validate().map_err(|reason| CatalogError::EntryInvalid { reason })?;

        if patch.is_empty() {
            return Ok(if self.get(id)?.is_some() { 1 } else { 0 });
        }

        if let Some(path) = &patch.path {
            let mut stmt = self
                .conn
                .prepare_cached("SELECT 1 FROM files WHERE file_path = ?1 AND file_id != ?2")?;
            if stmt.exists(params![path, id])? {
                return Err(CatalogError::DuplicateEntry { path: path.clone() });
            }
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();
        let mut assign = |column: &str, value: SqlValue| {
            values.push(value);
            assignments.push(format!("{column} = ?{}", values.len()));
        };

        if let Some(name) = &patch.name {
            assign("file_name", SqlValue::Text(name.clone()));
        }
        if let Some(ext) = &patch.extension {
            assign("file_ext", optional_text(ext));
        }
        if let Some(category) = &patch.category {
            assign("file_cat", optional_text(category));
        }
        if let Some(tags) = &patch.tags {
            assign("file_tags", SqlValue::Text(encode_tags(&normalize_tags(tags))));
        }
        if let Some(description) = &patch.description {
            assign("file_desc", optional_text(description));
        }
        if let Some(path) = &patch.path {
            assign("file_path", SqlValue::Text(path.clone()));
        }

        values.push(SqlValue::Integer(id));
        let sql = format!(
            "UPDATE files SET {} WHERE file_id = ?{}",
            assignments.join(", "),
            values.len()
        );
        let changed = self
            .conn
            .execute(&sql, params_from_iter(values.iter()))
            .map_err(|e| classify_write_error(e, patch.path.as_deref().unwrap_or_default()))?;
        log::debug!("Updated entry {id} ({changed} row(s))");
        Ok(changed)
    }

    /// Delete an entry by id. Returns 0 when no such entry exists.
    pub fn delete(&self, id: i64) -> Result<usize, CatalogError> {
        let removed = self.conn.execute("DELETE FROM files WHERE file_id = ?1", params![id])?;
        log::debug!("Deleted entry {id} ({removed} row(s))");
        Ok(removed)
    }
}

/// Text value for a nullable column; blank clears it.
fn optional_text(value: &str) -> SqlValue {
    match non_blank(Some(value.to_string())) {
        Some(v) => SqlValue::Text(v),
        None => SqlValue::Null,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tags::TagsInput;

    /// Create a CatalogStore backed by a temporary file.
    fn open_temp_store() -> (CatalogStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("catalog.sqlite");
        let store = CatalogStore::open(&db_path).expect("failed to open store");
        (store, dir)
    }

    fn file(path: &str, tags: &[&str]) -> CatalogEntryInput {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_string());
        CatalogEntryInput {
            name,
            extension,
            tags: TagsInput::from(tags),
            path: path.into(),
            ..Default::default()
        }
    }

    fn dir(path: &str) -> CatalogEntryInput {
        CatalogEntryInput {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.into(),
            is_directory: true,
            ..Default::default()
        }
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("catalog.sqlite");
        let store = CatalogStore::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.db_path(), db_path.as_path());
    }

    #[test]
    fn reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("catalog.sqlite");
        {
            let store = CatalogStore::open(&db_path).unwrap();
            store.insert(file("/keep/me.txt", &["x"])).unwrap();
        }
        let store = CatalogStore::open(&db_path).unwrap();
        assert!(store.exists("/keep/me.txt").unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn schema_version_is_stamped() {
        let (store, _dir) = open_temp_store();
        let version: i64 = store
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let (store, _dir) = open_temp_store();
        let mut input = file("/docs/report.pdf", &["work", "q3"]);
        input.category = Some("reports".into());
        input.description = Some("Quarterly numbers".into());
        input.created_time = DateTime::parse_from_rfc3339("2024-03-01T10:00:00.250Z")
            .ok()
            .map(|d| d.with_timezone(&Utc));

        let id = store.insert(input).unwrap();
        let entry = store.get(id).unwrap().unwrap();

        assert_eq!(entry.name, "report.pdf");
        assert_eq!(entry.extension.as_deref(), Some("pdf"));
        assert_eq!(entry.category.as_deref(), Some("reports"));
        assert_eq!(entry.tags, vec!["work".to_string(), "q3".to_string()]);
        assert_eq!(entry.description.as_deref(), Some("Quarterly numbers"));
        assert_eq!(
            entry.created_time.map(|t| format_timestamp(&t)).as_deref(),
            Some("2024-03-01T10:00:00.250Z")
        );
        assert!(entry.updated_time.is_none());
        assert!(!entry.is_directory);
    }

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let (store, _dir) = open_temp_store();
        let a = store.insert(file("/a.txt", &[])).unwrap();
        let b = store.insert(file("/b.txt", &[])).unwrap();
        assert!(b > a);
        store.delete(b).unwrap();
        let c = store.insert(file("/c.txt", &[])).unwrap();
        assert!(c > b, "AUTOINCREMENT must not hand out a deleted id again");
    }

    #[test]
    fn duplicate_path_is_rejected_regardless_of_other_fields() {
        let (store, _dir) = open_temp_store();
        store.insert(file("/a/b.txt", &["one"])).unwrap();

        let mut again = file("/a/b.txt", &["two"]);
        again.name = "different".into();
        again.is_directory = true;
        let err = store.insert(again).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateEntry { .. }), "got {err:?}");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn path_uniqueness_is_case_sensitive() {
        let (store, _dir) = open_temp_store();
        store.insert(file("/a/B.txt", &[])).unwrap();
        assert!(store.insert(file("/a/b.txt", &[])).is_ok());
    }

    #[test]
    fn constraint_violation_is_classified_as_duplicate() {
        let (store, _dir) = open_temp_store();
        store.insert(file("/race.txt", &[])).unwrap();

        // Simulate a writer that slipped past the pre-check
        let err = store
            .conn
            .execute(
                "INSERT INTO files (file_name, file_path) VALUES ('race.txt', '/race.txt')",
                [],
            )
            .unwrap_err();
        let classified = classify_write_error(err, "/race.txt");
        assert!(matches!(classified, CatalogError::DuplicateEntry { .. }), "got {classified:?}");
    }

    #[test]
    fn other_write_errors_stay_storage_failures() {
        let (store, _dir) = open_temp_store();
        let err = store
            .conn
            .execute("INSERT INTO files (file_path) VALUES ('/no-name')", [])
            .unwrap_err();
        let classified = classify_write_error(err, "/no-name");
        assert!(classified.is_storage_failure(), "got {classified:?}");
    }

    #[test]
    fn invalid_input_is_rejected_before_writing() {
        let (store, _dir) = open_temp_store();
        let err = store.insert(file("relative/path.txt", &[])).unwrap_err();
        assert!(matches!(err, CatalogError::EntryInvalid { .. }));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn pre_encoded_and_raw_tags_are_normalized() {
        let (store, _dir) = open_temp_store();

        let mut encoded = file("/enc.txt", &[]);
        encoded.tags = TagsInput::Encoded(r#"["a","b"]"#.into());
        let id = store.insert(encoded).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().tags, vec!["a", "b"]);

        let mut raw = file("/raw.txt", &[]);
        raw.tags = TagsInput::Encoded("loose tag".into());
        let id = store.insert(raw).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().tags, vec!["loose tag"]);
    }

    #[test]
    fn empty_tags_are_persisted_as_empty_array() {
        let (store, _dir) = open_temp_store();
        let id = store.insert(file("/none.txt", &[])).unwrap();
        let stored: Option<String> = store
            .conn
            .query_row("SELECT file_tags FROM files WHERE file_id = ?1", params![id], |row| row.get(0))
            .unwrap();
        assert_eq!(stored.as_deref(), Some("[]"));
    }

    #[test]
    fn malformed_stored_tags_read_as_empty() {
        let (store, _dir) = open_temp_store();
        let id = store.insert(file("/bad.txt", &["x"])).unwrap();
        store
            .conn
            .execute("UPDATE files SET file_tags = 'not json' WHERE file_id = ?1", params![id])
            .unwrap();
        assert!(store.get(id).unwrap().unwrap().tags.is_empty());
    }

    #[test]
    fn added_time_defaults_to_now_and_is_whole_seconds() {
        let (store, _dir) = open_temp_store();
        let before = Utc::now().naive_utc().trunc_subsecs(0);
        let id = store.insert(file("/now.txt", &[])).unwrap();
        let after = Utc::now().naive_utc();
        let entry = store.get(id).unwrap().unwrap();
        assert!(entry.added_time >= before && entry.added_time <= after);
        assert_eq!(entry.added_time, entry.added_time.trunc_subsecs(0));
    }

    #[test]
    fn supplied_added_time_is_kept() {
        let (store, _dir) = open_temp_store();
        let when = NaiveDateTime::parse_from_str("2023-05-06 07:08:09", ADDED_TIME_FORMAT).unwrap();
        let mut input = file("/old.txt", &[]);
        input.added_time = Some(when);
        let id = store.insert(input).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().added_time, when);
    }

    #[test]
    fn delete_reports_removed_count() {
        let (store, _dir) = open_temp_store();
        let id = store.insert(file("/gone.txt", &[])).unwrap();
        assert_eq!(store.delete(id).unwrap(), 1);
        assert_eq!(store.delete(id).unwrap(), 0);
        assert_eq!(store.delete(9999).unwrap(), 0);
        assert!(!store.exists("/gone.txt").unwrap());
    }

    #[test]
    fn update_changes_fields_and_clears_blank_optionals() {
        let (store, _dir) = open_temp_store();
        let mut input = file("/u.txt", &["old"]);
        input.category = Some("cat".into());
        input.description = Some("desc".into());
        let id = store.insert(input).unwrap();

        let patch = CatalogEntryUpdate {
            category: Some(String::new()),
            description: Some("new desc".into()),
            tags: Some(TagsInput::List(vec!["new".into()])),
            ..Default::default()
        };
        assert_eq!(store.update(id, patch).unwrap(), 1);

        let entry = store.get(id).unwrap().unwrap();
        assert_eq!(entry.category, None);
        assert_eq!(entry.description.as_deref(), Some("new desc"));
        assert_eq!(entry.tags, vec!["new"]);
        assert_eq!(entry.name, "u.txt");
    }

    #[test]
    fn update_path_rechecks_uniqueness() {
        let (store, _dir) = open_temp_store();
        store.insert(file("/one.txt", &[])).unwrap();
        let two = store.insert(file("/two.txt", &[])).unwrap();

        let patch = CatalogEntryUpdate {
            path: Some("/one.txt".into()),
            ..Default::default()
        };
        let err = store.update(two, patch).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateEntry { .. }));

        // Same path as itself is fine
        let patch = CatalogEntryUpdate {
            path: Some("/two.txt".into()),
            ..Default::default()
        };
        assert_eq!(store.update(two, patch).unwrap(), 1);

        let patch = CatalogEntryUpdate {
            path: Some("/three.txt".into()),
            ..Default::default()
        };
        assert_eq!(store.update(two, patch).unwrap(), 1);
        assert!(store.exists("/three.txt").unwrap());
        assert!(!store.exists("/two.txt").unwrap());
    }

    #[test]
    fn update_unknown_id_or_empty_patch() {
        let (store, _dir) = open_temp_store();
        let id = store.insert(file("/x.txt", &[])).unwrap();
        assert_eq!(store.update(id, CatalogEntryUpdate::default()).unwrap(), 1);
        assert_eq!(store.update(4242, CatalogEntryUpdate::default()).unwrap(), 0);
        let patch = CatalogEntryUpdate {
            name: Some("renamed".into()),
            ..Default::default()
        };
        assert_eq!(store.update(4242, patch).unwrap(), 0);
    }

    #[test]
    fn update_rejects_invalid_values() {
        let (store, _dir) = open_temp_store();
        let id = store.insert(file("/x.txt", &[])).unwrap();
        let patch = CatalogEntryUpdate {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update(id, patch).unwrap_err(),
            CatalogError::EntryInvalid { .. }
        ));
    }

    #[test]
    fn statistics_counts_and_file_types() {
        let (store, _dir) = open_temp_store();
        store.insert(file("/a.txt", &[])).unwrap();
        store.insert(file("/b.txt", &[])).unwrap();
        store.insert(file("/c.md", &[])).unwrap();
        store.insert(file("/Makefile", &[])).unwrap();
        store.insert(dir("/folder")).unwrap();

        let stats = store.statistics().unwrap();
        assert_eq!(stats.file_count, 4);
        assert_eq!(stats.dir_count, 1);
        assert_eq!(stats.file_count + stats.dir_count, store.count().unwrap());
        assert_eq!(stats.file_types.get("txt"), Some(&2));
        assert_eq!(stats.file_types.get("md"), Some(&1));
        assert_eq!(stats.file_types.get(""), Some(&1));
        assert_eq!(stats.file_types.len(), 3);
    }

    #[test]
    fn statistics_on_empty_store() {
        let (store, _dir) = open_temp_store();
        let stats = store.statistics().unwrap();
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.dir_count, 0);
        assert!(stats.file_types.is_empty());
        assert!(stats.recent_files.is_empty());
    }

    #[test]
    fn empty_and_null_extensions_share_a_bucket() {
        let (store, _dir) = open_temp_store();
        store.insert(file("/noext", &[])).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO files (file_name, file_ext, file_tags, file_path, is_directory)
                 VALUES ('legacy', '', '[]', '/legacy', 0)",
                [],
            )
            .unwrap();
        let stats = store.statistics().unwrap();
        assert_eq!(stats.file_types.get(""), Some(&2));
    }

    #[test]
    fn list_categories_is_distinct_and_skips_empty() {
        let (store, _dir) = open_temp_store();
        for (path, cat) in [("/1", Some("work")), ("/2", Some("home")), ("/3", Some("work")), ("/4", None)] {
            let mut input = file(path, &[]);
            input.category = cat.map(str::to_string);
            store.insert(input).unwrap();
        }
        assert_eq!(store.list_categories().unwrap(), vec!["home", "work"]);
    }

    #[test]
    fn list_tags_unions_and_skips_malformed_rows() {
        let (store, _dir) = open_temp_store();
        store.insert(file("/1", &["b", "a"])).unwrap();
        store.insert(file("/2", &["a", "c", ""])).unwrap();
        let bad = store.insert(file("/3", &["lost"])).unwrap();
        store
            .conn
            .execute("UPDATE files SET file_tags = '[oops' WHERE file_id = ?1", params![bad])
            .unwrap();

        assert_eq!(store.list_tags().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn legacy_rows_are_readable() {
        let (store, _dir) = open_temp_store();
        // Row shape written by the earlier app: ISO timestamps, NULL tags, CURRENT_TIMESTAMP
        store
            .conn
            .execute(
                "INSERT INTO files (file_name, file_ext, file_tags, file_created_time, file_path, is_directory)
                 VALUES ('old.doc', 'doc', NULL, '2023-01-02T03:04:05.000Z', '/old.doc', 0)",
                [],
            )
            .unwrap();
        let entries = store
            .search(&SearchCriteria {
                keyword: Some("old".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].tags.is_empty());
        assert!(entries[0].created_time.is_some());
    }
}
