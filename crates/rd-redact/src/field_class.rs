//! Field classification for redaction decisions.

use serde::{Deserialize, Serialize};

/// Classification of dumped values for redaction decisions.
///
/// Each class is governed by its own filter slot in the
/// [`RedactionPolicy`](crate::RedactionPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Request parameter (query string or form body)
    Parameter,
    /// Request cookie (and response cookies in the extended dump)
    Cookie,
    /// Request header
    RequestHeader,
    /// Response header
    ResponseHeader,
}

impl FieldClass {
    /// Every field class, in filter slot order.
    pub const ALL: [FieldClass; 4] = [
        FieldClass::Parameter,
        FieldClass::Cookie,
        FieldClass::RequestHeader,
        FieldClass::ResponseHeader,
    ];

    /// The init-parameter key that configures this class's filter.
    pub fn config_key(&self) -> &'static str {
        match self {
            FieldClass::Parameter => "paramFilter",
            FieldClass::Cookie => "cookieFilter",
            FieldClass::RequestHeader => "requestHeaderFilter",
            FieldClass::ResponseHeader => "responseHeaderFilter",
        }
    }

    /// Slot index used by the policy.
    pub(crate) fn slot(&self) -> usize {
        match self {
            FieldClass::Parameter => 0,
            FieldClass::Cookie => 1,
            FieldClass::RequestHeader => 2,
            FieldClass::ResponseHeader => 3,
        }
    }

    /// Parse a field class from its snake_case name or its init-parameter key.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "parameter" | "paramFilter" => Some(FieldClass::Parameter),
            "cookie" | "cookieFilter" => Some(FieldClass::Cookie),
            "request_header" | "requestHeaderFilter" => Some(FieldClass::RequestHeader),
            "response_header" | "responseHeaderFilter" => Some(FieldClass::ResponseHeader),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldClass::Parameter => "parameter",
            FieldClass::Cookie => "cookie",
            FieldClass::RequestHeader => "request_header",
            FieldClass::ResponseHeader => "response_header",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_display_name() {
        for class in FieldClass::ALL {
            assert_eq!(FieldClass::parse_str(&class.to_string()), Some(class));
        }
    }

    #[test]
    fn test_parse_config_key() {
        for class in FieldClass::ALL {
            assert_eq!(FieldClass::parse_str(class.config_key()), Some(class));
        }
        assert_eq!(FieldClass::parse_str("headerFilter"), None);
    }

    #[test]
    fn test_slots_are_distinct() {
        let slots: HashSet<usize> = FieldClass::ALL.iter().map(|c| c.slot()).collect();
        assert_eq!(slots.len(), FieldClass::ALL.len());
        assert!(slots.iter().all(|&slot| slot < FieldClass::ALL.len()));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&FieldClass::RequestHeader).unwrap(),
            "\"request_header\""
        );
    }
}
