//! Translates `SearchCriteria` into a parameterized WHERE clause.
//!
//! Values are always bound as parameters, never spliced into SQL text. Substring
//! matches use SQLite's LIKE, which folds ASCII case only.

use rusqlite::types::Value as SqlValue;

use super::tags::{escape_like, tag_like_pattern};
use super::types::SearchCriteria;

/// Format of `added_time` in the database. Fixed-width, so string order is time order.
pub const ADDED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A WHERE clause plus its positional parameters.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    clause: String,
    params: Vec<SqlValue>,
    /// Tags requested by the criteria, for exact re-checking after the LIKE prefilter
    tags: Vec<String>,
}

impl SearchFilter {
    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Whether a row's decoded tags satisfy the tag condition (any requested tag present).
    ///
    /// The LIKE prefilter can hit a tag value that itself contains a quote, so rows are
    /// confirmed here. Comparison folds ASCII case, matching LIKE.
    pub fn matches_tags(&self, entry_tags: &[String]) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        self.tags
            .iter()
            .any(|wanted| entry_tags.iter().any(|t| t.eq_ignore_ascii_case(wanted)))
    }
}

/// Build the filter for `criteria`.
///
/// Returns `None` when no recognized field is set, meaning "match nothing".
/// Callers should return an empty result instead of running an unrestricted query.
pub fn build_filter(criteria: &SearchCriteria) -> Option<SearchFilter> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();

    if let Some(keyword) = present(&criteria.keyword) {
        let pattern = contains_pattern(keyword);
        conditions.push(format!(
            "(file_name LIKE ?{} ESCAPE '\\' OR file_desc LIKE ?{} ESCAPE '\\')",
            params.len() + 1,
            params.len() + 2
        ));
        params.push(SqlValue::Text(pattern.clone()));
        params.push(SqlValue::Text(pattern));
    }

    if let Some(name) = present(&criteria.file_name) {
        conditions.push(format!("file_name LIKE ?{} ESCAPE '\\'", params.len() + 1));
        params.push(SqlValue::Text(contains_pattern(name)));
    }

    if let Some(category) = present(&criteria.category) {
        conditions.push(format!("file_cat = ?{}", params.len() + 1));
        params.push(SqlValue::Text(category.to_string()));
    }

    // Blank tags are skipped; the rest match as given, padding included
    let tags: Vec<String> = criteria
        .tags
        .iter()
        .filter(|t| !t.trim().is_empty())
        .cloned()
        .collect();
    if !tags.is_empty() {
        let mut tag_conditions = Vec::with_capacity(tags.len());
        for tag in &tags {
            tag_conditions.push(format!("file_tags LIKE ?{} ESCAPE '\\'", params.len() + 1));
            params.push(SqlValue::Text(tag_like_pattern(tag)));
        }
        conditions.push(format!("({})", tag_conditions.join(" OR ")));
    }

    if let Some(start) = criteria.start_date {
        let start_of_day = start.and_hms_opt(0, 0, 0)?;
        conditions.push(format!("added_time >= ?{}", params.len() + 1));
        params.push(SqlValue::Text(start_of_day.format(ADDED_TIME_FORMAT).to_string()));
    }

    if let Some(end) = criteria.end_date {
        // Stored times have whole-second resolution, so 23:59:59 covers the whole day
        let end_of_day = end.and_hms_opt(23, 59, 59)?;
        conditions.push(format!("added_time <= ?{}", params.len() + 1));
        params.push(SqlValue::Text(end_of_day.format(ADDED_TIME_FORMAT).to_string()));
    }

    if conditions.is_empty() {
        return None;
    }

    Some(SearchFilter {
        clause: conditions.join(" AND "),
        params,
        tags,
    })
}

/// The value as given, or `None` when missing or blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}
