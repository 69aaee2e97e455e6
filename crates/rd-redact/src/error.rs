//! Error types for the redaction policy.

use thiserror::Error;

use crate::FieldClass;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while configuring redaction.
///
/// Only configuration can fail. Applying a policy to a value never does.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// A filter pattern is not a valid regular expression.
    #[error("invalid {class} pattern {pattern:?}: {source}")]
    InvalidPattern {
        class: FieldClass,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RedactionError {
    /// The field class whose filter failed to compile.
    pub fn field_class(&self) -> FieldClass {
        match self {
            RedactionError::InvalidPattern { class, .. } => *class,
        }
    }
}
