//! Configuration errors.

use std::path::PathBuf;

use rd_redact::RedactionError;
use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building the dumper configuration.
///
/// All of these surface during setup; none can occur while a request is
/// being dumped.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    InvalidPattern(#[from] RedactionError),
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::Io { .. } => 60,
            ConfigError::Parse { .. } => 61,
            ConfigError::InvalidValue { .. } => 65,
            ConfigError::InvalidPattern(_) => 66,
        }
    }

    /// The configuration key the error refers to, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { key, .. } => Some(key),
            ConfigError::InvalidPattern(err) => Some(err.field_class().config_key()),
            _ => None,
        }
    }
}
