//! Configuration module for paneltone.
//!
//! The configuration file only supplies defaults for the analysis parameters and
//! the watcher; command-line flags always win. It supports JSONC format (JSON
//! with comments).

pub mod template;
pub mod types;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use types::{
    AnalysisConfig, ConfigError, DEFAULT_DEBOUNCE_MS, MAX_DEBOUNCE_MS, MIN_DEBOUNCE_MS,
    PaneltoneConfig, WatchConfig, config_paths, find_config_path, load_config,
    load_config_from_path, parse_config,
};

/// Global configuration instance, loaded once per process.
static CONFIG: OnceLock<PaneltoneConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` or `get_config()` to take effect.
///
/// Returns `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Loads the configuration from disk, or the defaults if loading fails.
///
/// A missing file is normal; nothing is written to disk in that case.
fn load_or_default() -> PaneltoneConfig {
    let path = CUSTOM_CONFIG_PATH.get().cloned().or_else(find_config_path);
    let (config, path) = load_or_default_from(path);

    if let Some(path) = path {
        let _ = CONFIG_PATH.set(path);
    }
    config
}

/// Loads `path`, falling back to the defaults.
///
/// The path is returned whenever the file exists, even if it fails to parse,
/// so a watcher can pick up a later fix.
fn load_or_default_from(path: Option<PathBuf>) -> (PaneltoneConfig, Option<PathBuf>) {
    let Some(path) = path else {
        tracing::debug!("no configuration file found, using defaults");
        return (PaneltoneConfig::default(), None);
    };

    match load_config_from_path(&path) {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            (config, Some(path))
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!(path = %path.display(), "configuration file not found, using defaults");
            (PaneltoneConfig::default(), None)
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to load configuration, using defaults");
            (PaneltoneConfig::default(), Some(path))
        }
    }
}

/// Initializes and returns the global configuration instance.
///
/// Idempotent: later calls return the instance loaded by the first one.
pub fn init() -> &'static PaneltoneConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the global configuration instance, initializing it if necessary.
pub fn get_config() -> &'static PaneltoneConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the configuration file in use, if any.
///
/// Set even when the file failed to parse and the defaults were used.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }
