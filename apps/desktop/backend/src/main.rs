//! Catalog backend host.
//!
//! Reads JSON-lines requests on stdin and writes one JSON response per line on stdout.
//! Logs go to stderr.
//!
//! Environment variables:
//!   FILECAT_DB_PATH   - Database file (default: <data dir>/filecat/database.sqlite)
//!   FILECAT_LOG_LEVEL - Default log filter when RUST_LOG is unset (default: info)

use std::process::ExitCode;

use tokio::io::{BufReader, stdin, stdout};

#[tokio::main]
async fn main() -> ExitCode {
    let (state, config) = match filecat_lib::start().await {
        Ok(ready) => ready,
        Err(e) => {
            log::error!("Couldn't open the catalog: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Serving catalog {} on stdio", config.db_path.display());

    let result = filecat_lib::serve(&state, BufReader::new(stdin()), stdout()).await;
    state.close();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Stdio transport failed: {e}");
            ExitCode::FAILURE
        }
    }
}
