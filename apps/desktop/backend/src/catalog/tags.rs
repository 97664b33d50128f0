//! Tag encoding for the `file_tags` column.
//!
//! Tags are stored as a JSON array of strings. JSON quoting wraps every element,
//! so a search for `%"ab"%` hits a record tagged `ab` but never one tagged `abc`.
//! Decoding fails soft: listing paths must survive a single bad row.

use serde::{Deserialize, Serialize};

/// Tags as supplied by a caller.
///
/// The frontend sometimes sends a pre-serialized string instead of a list, so both
/// shapes are accepted. `null` or a missing field maps to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Encoded(String),
    #[default]
    Absent,
}

impl From<Vec<String>> for TagsInput {
    fn from(tags: Vec<String>) -> Self {
        TagsInput::List(tags)
    }
}

impl From<&[&str]> for TagsInput {
    fn from(tags: &[&str]) -> Self {
        TagsInput::List(tags.iter().map(|t| t.to_string()).collect())
    }
}

/// The persisted tag string could not be parsed as a JSON array of strings.
#[derive(Debug)]
pub struct MalformedTagData(serde_json::Error);

impl std::fmt::Display for MalformedTagData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Malformed tag data: {}", self.0)
    }
}

impl std::error::Error for MalformedTagData {}

/// Encode tags for storage. Always produces a JSON array, `[]` when empty.
pub fn encode_tags(tags: &[String]) -> String {
    serde_json::Value::from(tags.to_vec()).to_string()
}

/// Resolve caller-supplied tags into a list.
///
/// A pre-encoded string passes through only when it is a valid JSON array of strings;
/// anything else is treated as one raw tag. A blank raw string means no tags.
pub fn normalize_tags(input: &TagsInput) -> Vec<String> {
    match input {
        TagsInput::List(tags) => tags.clone(),
        TagsInput::Encoded(raw) if raw.trim().is_empty() => Vec::new(),
        TagsInput::Encoded(raw) => decode_tags(raw).unwrap_or_else(|_| vec![raw.clone()]),
        TagsInput::Absent => Vec::new(),
    }
}

/// Decode a stored tag string.
pub fn decode_tags(encoded: &str) -> Result<Vec<String>, MalformedTagData> {
    serde_json::from_str::<Vec<String>>(encoded).map_err(MalformedTagData)
}

/// Decode a stored tag column, degrading to an empty list on NULL, blank, or malformed data.
pub fn decode_tags_lossy(encoded: Option<&str>) -> Vec<String> {
    match encoded {
        None => Vec::new(),
        Some(s) if s.trim().is_empty() => Vec::new(),
        Some(s) => decode_tags(s).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable tag column: {e}");
            Vec::new()
        }),
    }
}

/// LIKE pattern that matches an encoded tag column containing `tag` as a whole element.
///
/// Must be used with `ESCAPE '\'`.
pub fn tag_like_pattern(tag: &str) -> String {
    let quoted = serde_json::Value::from(tag).to_string();
    format!("%{}%", escape_like(&quoted))
}

/// Escape LIKE metacharacters so the value matches literally under `ESCAPE '\'`.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
