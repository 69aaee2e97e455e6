//! Field-level redaction for request dump output.
//!
//! This crate provides the redaction policy consulted by the request dumper
//! before any cookie, header or parameter value reaches the log sink.
//!
//! # Key Features
//!
//! - **Per-class filters**: Parameters, cookies, request headers and response
//!   headers each have their own optional name filter.
//! - **Full-match semantics**: A filter masks a value only when its pattern
//!   matches the whole field name, never a substring of it.
//! - **Hot-swappable**: Each filter slot is an immutable compiled snapshot
//!   that can be replaced atomically while other threads keep reading.
//! - **Value-only masking**: Names are always logged; values are replaced
//!   with [`REDACTED_MARKER`] in full.
//!
//! # Example
//!
//! ```
//! use rd_redact::{FieldClass, RedactionPolicy};
//!
//! let policy = RedactionPolicy::default();
//! assert_eq!(policy.apply(FieldClass::Parameter, "password", "secret"), "XXXXXX");
//! assert_eq!(policy.apply(FieldClass::Parameter, "passwordConfirm", "secret"), "secret");
//! ```

pub mod error;
pub mod field_class;
pub mod policy;

pub use error::{RedactionError, Result};
pub use field_class::FieldClass;
pub use policy::{NameFilter, RedactionPolicy, DEFAULT_PARAM_FILTER, REDACTED_MARKER};
