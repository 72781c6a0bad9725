//! Centralized path helpers for config and cache directories.

use std::path::PathBuf;

use crate::core::app;

/// Env var that overrides the config directory (used by integration tests and portable installs).
pub const CONFIG_DIR_ENV: &str = "ENHANCE_CONFIG_DIR";

/// Project directories (config, cache) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/enhance/), or `ENHANCE_CONFIG_DIR` when set.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/enhance/). Holds the host-mode log file.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

/// Settings storage file (`storage.json` in the config directory).
pub fn storage_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("storage.json"))
}
