//! Errors for the dumper front end.

use std::path::PathBuf;

use rd_config::ConfigError;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Result type for rd-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid exchange file {path}: {message}")]
    Exchange { path: PathBuf, message: String },
}

impl CoreError {
    /// Exit code the CLI reports for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CoreError::Config(ConfigError::Io { .. }) => ExitCode::IoError,
            CoreError::Config(_) => ExitCode::ConfigError,
            CoreError::Io { .. } => ExitCode::IoError,
            CoreError::Exchange { .. } => ExitCode::InputError,
        }
    }
}
