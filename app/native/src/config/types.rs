//! Configuration types for paneltone.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{AnalysisOptions, DEFAULT_LUMINANCE_THRESHOLD, DEFAULT_PANEL_HEIGHT};
use crate::constants::{APP_NAME, CONFIG_FILE_NAMES, LEGACY_CONFIG_FILE_NAMES};
use crate::platform::path::expand_and_resolve;

/// Default settle time for wallpaper change events, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// Lowest accepted debounce, in milliseconds.
pub const MIN_DEBOUNCE_MS: u64 = 100;

/// Highest accepted debounce, in milliseconds.
pub const MAX_DEBOUNCE_MS: u64 = 1000;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PaneltoneConfig {
    /// Defaults for wallpaper analysis.
    pub analysis: AnalysisConfig,

    /// Settings for `paneltone watch`.
    pub watch: WatchConfig,
}

/// Defaults applied when the caller does not pass analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Mean luminance below which a wallpaper counts as dark (0.0 - 1.0).
    pub luminance_threshold: f64,

    /// Height of the panel in pixels. Only this strip of the wallpaper is sampled.
    pub panel_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            luminance_threshold: DEFAULT_LUMINANCE_THRESHOLD,
            panel_height: DEFAULT_PANEL_HEIGHT,
        }
    }
}

impl AnalysisConfig {
    /// Converts the configured values into analysis options.
    #[must_use]
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions::new(self.luminance_threshold, self.panel_height)
    }
}

/// Wallpaper watching configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchConfig {
    /// Wallpaper to watch when none is given on the command line.
    /// Relative paths are resolved against the configuration file's directory.
    pub wallpaper: String,

    /// Time in milliseconds a change must settle before the wallpaper is
    /// analyzed again. Clamped to 100 - 1000.
    pub debounce_ms: u64,

    /// Shell command run whenever the applied style changes.
    /// The style is available in the `PANELTONE_STYLE` environment variable.
    pub exec: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            wallpaper: String::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            exec: String::new(),
        }
    }
}

impl WatchConfig {
    /// Returns the debounce duration in milliseconds, clamped to the accepted range.
    #[must_use]
    pub fn debounce_ms(&self) -> u64 { self.debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS) }

    /// Resolves the configured wallpaper path.
    ///
    /// Returns `None` if no wallpaper is configured.
    #[must_use]
    pub fn wallpaper_path(&self, config_dir: Option<&Path>) -> Option<PathBuf> {
        if self.wallpaper.trim().is_empty() {
            return None;
        }
        Some(expand_and_resolve(&self.wallpaper, config_dir))
    }

    /// Returns the hook command, if one is configured.
    #[must_use]
    pub fn exec_command(&self) -> Option<&str> {
        let command = self.exec.trim();
        (!command.is_empty()).then_some(command)
    }
}

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/paneltone/config.jsonc or $XDG_CONFIG_HOME/paneltone/config.jsonc"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/paneltone/config.jsonc` (if `XDG_CONFIG_HOME` is set)
/// 2. `~/.config/paneltone/config.jsonc`
/// 3. The platform configuration directory (`~/Library/Application Support` on macOS)
/// 4. `~/.paneltone.jsonc` (simple location)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut dirs_to_check = Vec::new();

    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        dirs_to_check.push(PathBuf::from(xdg_config).join(APP_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        dirs_to_check.push(home.join(".config").join(APP_NAME));
    }

    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_check.push(config_dir.join(APP_NAME));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for dir in dirs_to_check {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME and the platform directory are often ~/.config
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Parses a configuration from a JSONC reader.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` if the content is not valid JSON after
/// stripping comments.
pub fn parse_config<R: std::io::Read>(reader: R) -> Result<PaneltoneConfig, ConfigError> {
    let reader = json_comments::StripComments::new(reader);
    Ok(serde_json::from_reader(reader)?)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read and `ConfigError::ParseError`
/// if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(PaneltoneConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let config = parse_config(file)?;
    Ok((config, path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the
/// expected locations, or the error of the first file that exists but fails to load.
pub fn load_config() -> Result<(PaneltoneConfig, PathBuf), ConfigError> {
    find_config_path().map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}

/// Returns the first configuration file that exists, if any.
#[must_use]
pub fn find_config_path() -> Option<PathBuf> { config_paths().into_iter().find(|path| path.exists()) }
