//! Error types for the paneltone application layer.
//!
//! Library modules expose their own error enums ([`crate::analysis::AnalysisError`],
//! [`crate::config::ConfigError`], [`crate::session::SessionError`]); CLI commands
//! convert them into [`PaneltoneError`], which serializes as `{kind, message}`
//! for JSON output.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum PaneltoneError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Watching a wallpaper failed.
    #[error("Watch error: {0}")]
    WatchError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for PaneltoneError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for PaneltoneError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<crate::config::ConfigError> for PaneltoneError {
    fn from(err: crate::config::ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<crate::session::SessionError> for PaneltoneError {
    fn from(err: crate::session::SessionError) -> Self { Self::WatchError(err.to_string()) }
}

impl From<String> for PaneltoneError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for PaneltoneError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arguments_display() {
        let err = PaneltoneError::InvalidArguments("No wallpaper given".to_string());
        assert_eq!(err.to_string(), "No wallpaper given");
    }

    #[test]
    fn test_config_error_display() {
        let err = PaneltoneError::ConfigError("Invalid JSON".to_string());
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PaneltoneError = io_err.into();
        assert!(matches!(err, PaneltoneError::IoError(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: PaneltoneError = crate::config::ConfigError::NotFound.into();
        assert!(matches!(err, PaneltoneError::ConfigError(_)));
    }

    #[test]
    fn test_from_str() {
        let err: PaneltoneError = "watch stopped".into();
        assert!(matches!(err, PaneltoneError::CommandError(_)));
    }

    #[test]
    fn test_error_serializes_with_kind() {
        let err = PaneltoneError::WatchError("inotify limit reached".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "WatchError");
        assert_eq!(json["message"], "inotify limit reached");
    }
}
