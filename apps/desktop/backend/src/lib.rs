// Deny unused code to catch dead code early
#![deny(unused)]
// Warn on unused dependencies
#![warn(unused_crate_dependencies)]
// Warn on redundant path prefixes (e.g., std::path::Path when Path is imported)
#![warn(unused_qualifications)]
// Use log::* macros instead of println!/eprintln!; stdout carries protocol responses
#![deny(clippy::print_stdout, clippy::print_stderr)]

//noinspection RsUnusedImport
// Silence false positives for dev dependencies (used only in benches/, not lib)
#[cfg(test)]
use criterion as _;

pub mod catalog;
pub mod commands;
pub mod config;
mod ignore_poison;
pub mod settings;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use catalog::CatalogState;
use commands::dispatch::{encode_response, handle_line};
use config::CatalogConfig;

/// Load settings and config, start logging, and open the catalog.
pub async fn start() -> Result<(CatalogState, CatalogConfig), commands::CommandError> {
    let settings = settings::load_settings(&config::data_dir());
    let config = CatalogConfig::from_settings_and_env(&settings);
    commands::logging::init_logging(&config.log_level);

    let state = CatalogState::new();
    commands::catalog::initialize(&state, &config).await?;
    Ok((state, config))
}

/// Serve JSON-lines requests from `reader` until it closes, writing one response line each.
///
/// Blank lines are skipped. Requests are handled in order.
pub async fn serve<R, W>(state: &CatalogState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(state, &line).await;
        let mut encoded = encode_response(&response);
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
    }
    log::info!("Input closed, shutting down");
    Ok(())
}
