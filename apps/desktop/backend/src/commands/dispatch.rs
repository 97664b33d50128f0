//! JSON-lines request dispatch.
//!
//! One request per line: `{"command": "search-files", "args": {...}}`.
//! One response per line: `{"ok": <value>}` or `{"error": {"kind": ..., "message": ...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{self, CommandError};
use super::logging::{self, FrontendLogEntry};
use crate::catalog::{CatalogEntryInput, CatalogEntryUpdate, CatalogState, SearchCriteria};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileArgs {
    pub id: i64,
    #[serde(alias = "updates")]
    pub patch: CatalogEntryUpdate,
}

#[derive(Debug, Deserialize)]
pub struct IdArgs {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathArgs {
    #[serde(alias = "filePath")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct LevelArgs {
    pub level: String,
}

/// A frontend call, keyed by channel name.
#[derive(Debug, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "kebab-case")]
pub enum Request {
    AddFile(CatalogEntryInput),
    UpdateFile(UpdateFileArgs),
    DeleteFile(IdArgs),
    SearchFiles(SearchCriteria),
    GetStats,
    CheckFileExists(PathArgs),
    IsFileCataloged(PathArgs),
    GetFileInfo(PathArgs),
    GetAllCategories,
    GetAllTags,
    SetLogLevel(LevelArgs),
    BatchFeLogs(Vec<FrontendLogEntry>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Response {
    Ok(Value),
    Error(CommandError),
}

impl<T: Serialize> From<Result<T, CommandError>> for Response {
    fn from(result: Result<T, CommandError>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(json) => Response::Ok(json),
                Err(e) => Response::Error(CommandError::StorageFailure {
                    message: format!("Couldn't encode response: {e}"),
                }),
            },
            Err(err) => Response::Error(err),
        }
    }
}

/// Parse and run one request line. Malformed input becomes an `invalidRequest` response.
pub async fn handle_line(state: &CatalogState, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(state, request).await,
        Err(e) => {
            log::warn!("Rejected malformed request: {e}");
            Response::Error(CommandError::invalid_request(format!("Malformed request: {e}")))
        }
    }
}

pub async fn dispatch(state: &CatalogState, request: Request) -> Response {
    match request {
        Request::AddFile(entry) => catalog::add_file(state, entry).await.into(),
        Request::UpdateFile(args) => catalog::update_file(state, args.id, args.patch).await.into(),
        Request::DeleteFile(args) => catalog::delete_file(state, args.id).await.into(),
        Request::SearchFiles(criteria) => catalog::search_files(state, criteria).await.into(),
        Request::GetStats => catalog::get_stats(state).await.into(),
        Request::CheckFileExists(args) => catalog::check_file_exists(args.path).await.into(),
        Request::IsFileCataloged(args) => catalog::is_file_cataloged(state, args.path).await.into(),
        Request::GetFileInfo(args) => catalog::get_file_info(args.path).await.into(),
        Request::GetAllCategories => catalog::get_all_categories(state).await.into(),
        Request::GetAllTags => catalog::get_all_tags(state).await.into(),
        Request::SetLogLevel(args) => {
            let filter = logging::set_log_level(&args.level);
            Ok::<_, CommandError>(filter.to_string().to_lowercase()).into()
        }
        Request::BatchFeLogs(entries) => {
            logging::batch_fe_logs(entries);
            Ok::<_, CommandError>(Value::Null).into()
        }
    }
}

/// Serialize a response as one line of JSON, without the trailing newline.
pub fn encode_response(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(r#"{{"error":{{"kind":"storageFailure","message":"Couldn't encode response: {e}"}}}}"#)
    })
}
