//! User settings, read from `settings.json` in the app's data directory.

mod loader;

pub use loader::{Settings, load_settings, settings_path};
