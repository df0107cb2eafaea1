// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::RawConfig;
use crate::errors::Result;

/// Bundled template used to seed a config when none exists yet.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.json");

/// Resolve the config file location.
///
/// - `CLEAVER_CONFIG` environment variable, if set.
/// - `$HOME/.config/cleaver.json` otherwise.
/// - `cleaver.json` in the current directory as a last resort.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("CLEAVER_CONFIG") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => {
            PathBuf::from(home).join(".config").join("cleaver.json")
        }
        _ => PathBuf::from("cleaver.json"),
    }
}

/// Seed the bundled default config if no file exists at `path`.
pub fn ensure_config_exists(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, DEFAULT_CONFIG)?;
    info!("config not found at {}; default config restored", path.display());
    Ok(())
}

/// Load a configuration file from `path`.
///
/// This only performs JSON deserialization into the loosely-typed
/// [`RawConfig`]; per-item normalization happens in
/// [`validate`](crate::config::validate) when the menu is built.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfig = serde_json::from_str(&contents)?;
    Ok(config)
}
