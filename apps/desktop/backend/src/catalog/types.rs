//! Catalog entry, input, and result types shared by the store, the query builder, and commands.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tags::TagsInput;

/// One cataloged file or directory, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub extension: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub updated_time: Option<DateTime<Utc>>,
    pub path: String,
    pub is_directory: bool,
    /// UTC, whole seconds
    pub added_time: NaiveDateTime,
}

/// Payload for inserting a new entry.
///
/// Aliases accept the field names the earlier desktop frontend sent (`fileName`, `filePath`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryInput {
    #[serde(alias = "fileName")]
    pub name: String,
    #[serde(alias = "fileExt", default)]
    pub extension: Option<String>,
    #[serde(alias = "fileCat", default)]
    pub category: Option<String>,
    #[serde(alias = "fileTags", default)]
    pub tags: TagsInput,
    #[serde(alias = "fileDesc", default)]
    pub description: Option<String>,
    #[serde(alias = "fileCreatedTime", default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(alias = "fileUpdatedTime", default)]
    pub updated_time: Option<DateTime<Utc>>,
    #[serde(alias = "filePath")]
    pub path: String,
    #[serde(default)]
    pub is_directory: bool,
    #[serde(default)]
    pub added_time: Option<NaiveDateTime>,
}

impl CatalogEntryInput {
    /// Check required fields and blank out empty optional text.
    pub fn validate(mut self) -> Result<Self, String> {
        validate_name(&self.name)?;
        validate_path(&self.path)?;
        self.extension = non_blank(self.extension);
        self.category = non_blank(self.category);
        self.description = non_blank(self.description);
        Ok(self)
    }
}

/// Partial update of an existing entry. `None` leaves a field untouched.
///
/// For optional text fields, `Some("")` clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryUpdate {
    #[serde(alias = "fileName", default)]
    pub name: Option<String>,
    #[serde(alias = "fileExt", default)]
    pub extension: Option<String>,
    #[serde(alias = "fileCat", default)]
    pub category: Option<String>,
    #[serde(alias = "fileTags", default)]
    pub tags: Option<TagsInput>,
    #[serde(alias = "fileDesc", default)]
    pub description: Option<String>,
    #[serde(alias = "filePath", default)]
    pub path: Option<String>,
}

impl CatalogEntryUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(path) = &self.path {
            validate_path(path)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.extension.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.description.is_none()
            && self.path.is_none()
    }
}

/// Search request. All fields optional; present fields combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Matches name OR description
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(alias = "fileCat", default)]
    pub category: Option<String>,
    /// Matches if any of these tags is present
    #[serde(alias = "fileTags", default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Aggregate counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub file_count: u64,
    pub dir_count: u64,
    /// Extension -> count over files only. Files without an extension are keyed `""`.
    pub file_types: BTreeMap<String, u64>,
    pub recent_files: Vec<CatalogEntry>,
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name can't be empty".to_string());
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("Path can't be empty".to_string());
    }
    if !Path::new(path).is_absolute() {
        return Err("Path must be absolute".to_string());
    }
    Ok(())
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
