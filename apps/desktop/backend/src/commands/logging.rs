use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Warning,
    Error,
}

#[derive(Debug, Deserialize)]
pub struct FrontendLogEntry {
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

/// Re-emits log entries from the frontend through the Rust `log` facade, so they land on
/// stderr alongside backend logs.
pub fn batch_fe_logs(entries: Vec<FrontendLogEntry>) {
    for entry in &entries {
        let target = format!("FE:{}", entry.category);
        match entry.level {
            LogLevel::Debug => log::debug!(target: &target, "{}", entry.message),
            LogLevel::Info => log::info!(target: &target, "{}", entry.message),
            LogLevel::Warn | LogLevel::Warning => log::warn!(target: &target, "{}", entry.message),
            LogLevel::Error => log::error!(target: &target, "{}", entry.message),
        }
    }
}

/// Changes the global log level at runtime (called when the verbose logging setting is toggled).
pub fn set_log_level(level: &str) -> log::LevelFilter {
    let filter = parse_level(level);
    log::set_max_level(filter);
    log::info!("Log level changed to {filter}");
    filter
}

/// Unknown names fall back to `info`.
pub fn parse_level(level: &str) -> log::LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" | "warning" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "trace" => log::LevelFilter::Trace,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    }
}

/// Initialize `env_logger` on stderr. `RUST_LOG` wins over `default_filter`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(default_filter: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .try_init();
    if result.is_ok() {
        log::debug!("Logging initialized with default filter {default_filter}");
    }
}
