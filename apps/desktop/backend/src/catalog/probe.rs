//! Filesystem metadata for a path about to be cataloged.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the filesystem reports about a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub path: String,
    pub name: String,
    /// Without the leading dot. Empty for directories and extensionless files.
    pub extension: String,
    pub is_directory: bool,
    pub created_time: Option<DateTime<Utc>>,
    pub updated_time: Option<DateTime<Utc>>,
    pub size: u64,
}

/// Read metadata for `path`. Follows symlinks.
///
/// Birth time is unavailable on some filesystems; it reads as `None` there.
pub fn probe(path: &Path) -> std::io::Result<FileInfo> {
    let metadata = std::fs::metadata(path)?;
    let is_directory = metadata.is_dir();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let extension = if is_directory {
        String::new()
    } else {
        path.extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    Ok(FileInfo {
        path: path.to_string_lossy().into_owned(),
        name,
        extension,
        is_directory,
        created_time: metadata.created().ok().map(DateTime::<Utc>::from),
        updated_time: metadata.modified().ok().map(DateTime::<Utc>::from),
        size: metadata.len(),
    })
}
