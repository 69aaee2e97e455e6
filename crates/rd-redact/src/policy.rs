//! Redaction policy.
//!
//! Holds one optional name filter per [`FieldClass`]. A filter decides, from
//! the name of a cookie, header or parameter alone, whether that field's
//! value is replaced by [`REDACTED_MARKER`] in the dump.
//!
//! Filters are read on every dumped field and written only when the
//! configuration changes, so each slot is an [`ArcSwapOption`] holding an
//! immutable compiled snapshot. Readers never block and never observe a
//! partially updated filter.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{FieldClass, RedactionError, Result};

/// Replacement for redacted values.
pub const REDACTED_MARKER: &str = "XXXXXX";

/// Parameter filter installed by [`RedactionPolicy::default`].
pub const DEFAULT_PARAM_FILTER: &str = "password";

static DEFAULT_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&anchored(DEFAULT_PARAM_FILTER)).unwrap());

fn anchored(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}

fn anchored_terminated(pattern: &str) -> String {
    format!("^(?:{}\n)$", pattern)
}

/// A compiled field-name filter.
///
/// Keeps the pattern as configured alongside a fully anchored compilation,
/// so that matching is always against the whole name.
#[derive(Debug, Clone)]
pub struct NameFilter {
    source: String,
    regex: Regex,
}

impl NameFilter {
    /// Compile a filter for `class` from a configured pattern.
    pub fn compile(class: FieldClass, pattern: &str) -> Result<Self> {
        let invalid = |source| RedactionError::InvalidPattern {
            class,
            pattern: pattern.to_string(),
            source,
        };

        // Validate the pattern as written so errors point at the user's text.
        Regex::new(pattern).map_err(invalid)?;
        let regex = match Regex::new(&anchored(pattern)) {
            Ok(regex) => regex,
            // A trailing `(?x)` comment swallows the closing group; end it first.
            Err(_) => Regex::new(&anchored_terminated(pattern)).map_err(invalid)?,
        };

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as it was configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern matches the entire `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl std::fmt::Display for NameFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Per-class redaction policy shared by every dumping thread.
pub struct RedactionPolicy {
    slots: [ArcSwapOption<NameFilter>; 4],
}

impl RedactionPolicy {
    /// Create a policy with the default filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that redacts nothing.
    pub fn unfiltered() -> Self {
        Self {
            slots: [
                ArcSwapOption::empty(),
                ArcSwapOption::empty(),
                ArcSwapOption::empty(),
                ArcSwapOption::empty(),
            ],
        }
    }

    /// Whether a field of `class` called `name` has its value masked.
    pub fn should_redact(&self, class: FieldClass, name: &str) -> bool {
        match self.slots[class.slot()].load().as_deref() {
            Some(filter) => filter.matches(name),
            None => false,
        }
    }

    /// Return the value to log for a field.
    ///
    /// Empty values are logged as-is for every class; otherwise the value is
    /// replaced by [`REDACTED_MARKER`] when the class's filter matches the
    /// whole field name.
    pub fn apply<'a>(&self, class: FieldClass, name: &str, value: &'a str) -> &'a str {
        if value.is_empty() || !self.should_redact(class, name) {
            value
        } else {
            REDACTED_MARKER
        }
    }

    /// Replace the filter for `class`.
    ///
    /// An empty pattern disables redaction for the class. A non-empty pattern
    /// is compiled before it is published; on error the previous filter
    /// stays in place.
    pub fn set_filter(&self, class: FieldClass, pattern: &str) -> Result<()> {
        let filter = if pattern.is_empty() {
            None
        } else {
            Some(NameFilter::compile(class, pattern)?)
        };
        self.replace_filter(class, filter);
        Ok(())
    }

    /// Publish an already compiled filter (or none) for `class`.
    pub fn replace_filter(&self, class: FieldClass, filter: Option<NameFilter>) {
        debug!(
            field_class = %class,
            pattern = filter.as_ref().map(NameFilter::as_str).unwrap_or(""),
            "redaction filter replaced"
        );
        self.slots[class.slot()].store(filter.map(Arc::new));
    }

    /// Disable redaction for `class`.
    pub fn clear_filter(&self, class: FieldClass) {
        self.replace_filter(class, None);
    }

    /// Snapshot of the filter currently installed for `class`.
    pub fn filter(&self, class: FieldClass) -> Option<Arc<NameFilter>> {
        self.slots[class.slot()].load_full()
    }

    /// The configured pattern for `class`, or `None` when disabled.
    pub fn pattern(&self, class: FieldClass) -> Option<String> {
        self.filter(class).map(|f| f.as_str().to_string())
    }

    pub fn set_param_filter(&self, pattern: &str) -> Result<()> {
        self.set_filter(FieldClass::Parameter, pattern)
    }

    pub fn set_cookie_filter(&self, pattern: &str) -> Result<()> {
        self.set_filter(FieldClass::Cookie, pattern)
    }

    pub fn set_request_header_filter(&self, pattern: &str) -> Result<()> {
        self.set_filter(FieldClass::RequestHeader, pattern)
    }

    pub fn set_response_header_filter(&self, pattern: &str) -> Result<()> {
        self.set_filter(FieldClass::ResponseHeader, pattern)
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        let policy = Self::unfiltered();
        policy.slots[FieldClass::Parameter.slot()].store(Some(Arc::new(NameFilter {
            source: DEFAULT_PARAM_FILTER.to_string(),
            regex: DEFAULT_PARAM_REGEX.clone(),
        })));
        policy
    }
}

impl std::fmt::Debug for RedactionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("RedactionPolicy");
        for class in FieldClass::ALL {
            s.field(class.config_key(), &self.pattern(class));
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RedactionPolicy::default();
        assert_eq!(
            policy.pattern(FieldClass::Parameter).as_deref(),
            Some(DEFAULT_PARAM_FILTER)
        );
        assert_eq!(policy.pattern(FieldClass::Cookie), None);
        assert_eq!(policy.pattern(FieldClass::RequestHeader), None);
        assert_eq!(policy.pattern(FieldClass::ResponseHeader), None);
    }

    #[test]
    fn test_default_masks_password_only() {
        let policy = RedactionPolicy::default();
        assert_eq!(policy.apply(FieldClass::Parameter, "password", "secret"), "XXXXXX");
        assert_eq!(
            policy.apply(FieldClass::Parameter, "passwordConfirm", "secret"),
            "secret"
        );
        assert_eq!(policy.apply(FieldClass::Parameter, "user", "alice"), "alice");
        assert_eq!(policy.apply(FieldClass::Cookie, "password", "secret"), "secret");
    }

    #[test]
    fn test_full_match_only() {
        let policy = RedactionPolicy::unfiltered();
        policy.set_request_header_filter("Auth").unwrap();

        assert!(policy.should_redact(FieldClass::RequestHeader, "Auth"));
        assert!(!policy.should_redact(FieldClass::RequestHeader, "Authorization"));
        assert!(!policy.should_redact(FieldClass::RequestHeader, "X-Auth"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let policy = RedactionPolicy::unfiltered();
        policy.set_cookie_filter("JSESSIONID|token").unwrap();

        assert!(policy.should_redact(FieldClass::Cookie, "JSESSIONID"));
        assert!(policy.should_redact(FieldClass::Cookie, "token"));
        assert!(!policy.should_redact(FieldClass::Cookie, "JSESSIONID_2"));
        assert!(!policy.should_redact(FieldClass::Cookie, "csrf_token"));
    }

    #[test]
    fn test_empty_value_never_redacted() {
        let policy = RedactionPolicy::default();
        policy.set_response_header_filter(".*").unwrap();

        assert_eq!(policy.apply(FieldClass::Parameter, "password", ""), "");
        assert_eq!(policy.apply(FieldClass::ResponseHeader, "ETag", ""), "");
        assert_eq!(policy.apply(FieldClass::ResponseHeader, "ETag", "abc"), "XXXXXX");
    }

    #[test]
    fn test_empty_pattern_disables_class() {
        let policy = RedactionPolicy::default();
        policy.set_param_filter("").unwrap();

        assert_eq!(policy.pattern(FieldClass::Parameter), None);
        assert_eq!(policy.apply(FieldClass::Parameter, "password", "secret"), "secret");
    }

    #[test]
    fn test_invalid_pattern_keeps_previous_filter() {
        let policy = RedactionPolicy::default();
        let err = policy.set_param_filter("pass(word").unwrap_err();

        assert_eq!(err.field_class(), FieldClass::Parameter);
        assert!(err.to_string().contains("pass(word"));
        assert!(!err.to_string().contains("^(?:"));
        assert_eq!(
            policy.pattern(FieldClass::Parameter).as_deref(),
            Some(DEFAULT_PARAM_FILTER)
        );
    }

    #[test]
    fn test_verbose_pattern_with_trailing_comment() {
        let policy = RedactionPolicy::unfiltered();
        policy
            .set_param_filter("(?x)password # login secret")
            .unwrap();

        assert!(policy.should_redact(FieldClass::Parameter, "password"));
        assert!(!policy.should_redact(FieldClass::Parameter, "passwordConfirm"));
        assert!(!policy.should_redact(FieldClass::Parameter, "password\n"));
        assert_eq!(
            policy.pattern(FieldClass::Parameter).as_deref(),
            Some("(?x)password # login secret")
        );
    }

    #[test]
    fn test_verbose_pattern_without_comment() {
        let policy = RedactionPolicy::unfiltered();
        policy.set_cookie_filter("(?x) JSESSIONID | token ").unwrap();

        assert!(policy.should_redact(FieldClass::Cookie, "JSESSIONID"));
        assert!(policy.should_redact(FieldClass::Cookie, "token"));
        assert!(!policy.should_redact(FieldClass::Cookie, " token "));
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let policy = RedactionPolicy::unfiltered();
        policy.set_cookie_filter("a").unwrap();
        let before = policy.filter(FieldClass::Cookie).unwrap();

        policy.set_cookie_filter("b").unwrap();

        assert_eq!(before.as_str(), "a");
        assert!(before.matches("a"));
        assert_eq!(policy.pattern(FieldClass::Cookie).as_deref(), Some("b"));
    }

    #[test]
    fn test_clear_filter() {
        let policy = RedactionPolicy::default();
        policy.clear_filter(FieldClass::Parameter);
        assert!(!policy.should_redact(FieldClass::Parameter, "password"));
    }

    #[test]
    fn test_debug_lists_patterns() {
        let policy = RedactionPolicy::default();
        let rendered = format!("{:?}", policy);
        assert!(rendered.contains("paramFilter: Some(\"password\")"));
        assert!(rendered.contains("cookieFilter: None"));
    }
}
