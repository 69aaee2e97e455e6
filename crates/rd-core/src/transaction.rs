//! Request and response capabilities consumed by the dumper.
//!
//! A request always offers the base [`ServletRequest`] accessors. Requests
//! that also speak HTTP expose the richer [`HttpRequest`] view through
//! [`ServletRequest::as_http`]; the dumper asks for it once per transaction
//! and falls back to sentinel values when it is absent. Responses follow
//! the same pattern.
//!
//! Accessors return `None` for values the transport does not carry; the
//! dumper renders those as `null`.

use serde::{Deserialize, Serialize};

/// A cookie as seen on a request or set on a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }
}

/// Base request capability shared by every transport.
pub trait ServletRequest {
    fn character_encoding(&self) -> Option<&str>;

    /// Declared body length, `None` when unknown.
    fn content_length(&self) -> Option<u64>;

    fn content_type(&self) -> Option<&str>;

    /// Preferred locale, e.g. `en_US`.
    fn locale(&self) -> &str;

    /// Parameter names in the order the transport reports them.
    fn parameter_names(&self) -> Vec<&str>;

    /// All values of a parameter, in order.
    fn parameter_values(&self, name: &str) -> Vec<&str>;

    fn protocol(&self) -> Option<&str>;

    fn remote_addr(&self) -> Option<&str>;

    fn remote_host(&self) -> Option<&str>;

    fn scheme(&self) -> Option<&str>;

    fn server_name(&self) -> Option<&str>;

    fn server_port(&self) -> u16;

    fn is_secure(&self) -> bool;

    /// The HTTP view of this request, when the transport provides one.
    fn as_http(&self) -> Option<&dyn HttpRequest> {
        None
    }
}

/// Richer HTTP request capability.
pub trait HttpRequest: ServletRequest {
    fn auth_type(&self) -> Option<&str>;

    fn context_path(&self) -> Option<&str>;

    fn cookies(&self) -> &[Cookie];

    /// Header names in the order the transport reports them.
    fn header_names(&self) -> Vec<&str>;

    /// All values of a header, in order.
    fn headers(&self, name: &str) -> Vec<&str>;

    fn method(&self) -> Option<&str>;

    fn path_info(&self) -> Option<&str>;

    fn query_string(&self) -> Option<&str>;

    fn remote_user(&self) -> Option<&str>;

    fn request_uri(&self) -> Option<&str>;

    fn requested_session_id(&self) -> Option<&str>;

    fn servlet_path(&self) -> Option<&str>;
}

/// Base response capability shared by every transport.
pub trait ServletResponse {
    fn content_type(&self) -> Option<&str>;

    /// Declared body length, `None` when unknown.
    fn content_length(&self) -> Option<u64>;

    /// The HTTP view of this response, when the transport provides one.
    fn as_http(&self) -> Option<&dyn HttpResponse> {
        None
    }
}

/// Richer HTTP response capability.
pub trait HttpResponse: ServletResponse {
    fn status(&self) -> u16;

    fn header_names(&self) -> Vec<&str>;

    fn headers(&self, name: &str) -> Vec<&str>;

    fn cookies(&self) -> &[Cookie];

    /// Status message, if one was set.
    fn message(&self) -> Option<&str>;
}
