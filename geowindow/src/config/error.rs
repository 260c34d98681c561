//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, validating or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting with no default was not provided.
    #[error("Missing required setting {section}.{key}")]
    Missing {
        section: &'static str,
        key: &'static str,
    },

    /// A setting could not be parsed.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    /// A duration or count that must be positive was not.
    #[error("{key} must be positive, got {value}")]
    NonPositive { key: String, value: i64 },

    /// `section.key` does not name a known setting.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The config file exists but is not valid INI.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
