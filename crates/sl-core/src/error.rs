//! Error types for sl-core

use thiserror::Error;

/// Core error type for Sluice
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: No database connection string was supplied
    #[error("[E004] DATABASE_URL is not set. Pass --database-url or export DATABASE_URL")]
    MissingDatabaseUrl,

    /// E005: Change-script directory does not exist
    #[error("[E005] Change-script directory not found: {path}")]
    ScriptsDirNotFound { path: String },

    /// E006: Change-script is not valid UTF-8
    #[error("[E006] Change-script '{name}' is not valid UTF-8")]
    ScriptNotUtf8 { name: String },

    /// E007: IO error with file path context
    #[error("[E007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
