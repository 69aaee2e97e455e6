//! Recorded exchanges.
//!
//! A [`RecordedExchange`] captures one request, the response the pipeline
//! produced for it, and optionally the error the pipeline raised instead.
//! Recorded requests and responses implement the transaction traits, so
//! an exchange can be replayed through a [`RequestDumper`](crate::RequestDumper)
//! exactly as a live server would drive it.
//!
//! Exchange files are JSON arrays:
//!
//! ```json
//! [{
//!   "name": "login",
//!   "request": {
//!     "protocol": "HTTP/1.1",
//!     "parameters": [["user", "alice"], ["password", "hunter2"]],
//!     "http": { "method": "POST", "request_uri": "/login",
//!               "headers": [["Authorization", "Basic YWxpY2U="]] }
//!   },
//!   "response": { "http": { "status": 302 } }
//! }]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::{Cookie, HttpRequest, HttpResponse, ServletRequest, ServletResponse};
use crate::{CoreError, Result};

/// Error raised by a replayed pipeline stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("pipeline failed: {0}")]
pub struct PipelineError(pub String);

fn default_locale() -> String {
    "en_US".to_string()
}

/// Names in first-seen order, without duplicates.
fn distinct_names(pairs: &[(String, String)], eq: fn(&str, &str) -> bool) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for (name, _) in pairs {
        if !names.iter().any(|n| eq(n, name)) {
            names.push(name);
        }
    }
    names
}

fn values_of<'a>(pairs: &'a [(String, String)], name: &str, eq: fn(&str, &str) -> bool) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(n, _)| eq(n, name))
        .map(|(_, v)| v.as_str())
        .collect()
}

fn exact(a: &str, b: &str) -> bool {
    a == b
}

fn ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// HTTP-only request attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequestParts {
    pub auth_type: Option<String>,
    pub context_path: Option<String>,
    pub cookies: Vec<Cookie>,
    /// Header name/value pairs; a repeated name is a multi-valued header.
    pub headers: Vec<(String, String)>,
    pub method: Option<String>,
    pub path_info: Option<String>,
    pub query_string: Option<String>,
    pub remote_user: Option<String>,
    pub request_uri: Option<String>,
    pub requested_session_id: Option<String>,
    pub servlet_path: Option<String>,
}

/// A recorded request. Without `http` it only offers the base capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedRequest {
    pub character_encoding: Option<String>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub locale: String,
    /// Parameter name/value pairs; a repeated name is a multi-valued parameter.
    pub parameters: Vec<(String, String)>,
    pub protocol: Option<String>,
    pub remote_addr: Option<String>,
    pub remote_host: Option<String>,
    pub scheme: Option<String>,
    pub server_name: Option<String>,
    pub server_port: u16,
    pub secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpRequestParts>,
}

impl Default for RecordedRequest {
    fn default() -> Self {
        Self {
            character_encoding: None,
            content_length: None,
            content_type: None,
            locale: default_locale(),
            parameters: Vec::new(),
            protocol: None,
            remote_addr: None,
            remote_host: None,
            scheme: None,
            server_name: None,
            server_port: 0,
            secure: false,
            http: None,
        }
    }
}

impl RecordedRequest {
    /// A base-capability request as a plain socket connector would see it.
    pub fn base() -> Self {
        Self {
            protocol: Some("HTTP/1.1".to_string()),
            remote_addr: Some("127.0.0.1".to_string()),
            remote_host: Some("localhost".to_string()),
            scheme: Some("http".to_string()),
            server_name: Some("localhost".to_string()),
            server_port: 8080,
            ..Self::default()
        }
    }

    /// An HTTP GET for `uri` on localhost:8080.
    pub fn http_get(uri: &str) -> Self {
        Self {
            http: Some(HttpRequestParts {
                method: Some("GET".to_string()),
                request_uri: Some(uri.to_string()),
                context_path: Some(String::new()),
                servlet_path: Some(uri.to_string()),
                ..HttpRequestParts::default()
            }),
            ..Self::base()
        }
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a header. No-op on a base-capability request.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Some(http) = self.http.as_mut() {
            http.headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Add a cookie. No-op on a base-capability request.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        if let Some(http) = self.http.as_mut() {
            http.cookies.push(Cookie::new(name, value));
        }
        self
    }

    fn http_parts(&self) -> Option<&HttpRequestParts> {
        self.http.as_ref()
    }

    fn http_field(&self, f: fn(&HttpRequestParts) -> &Option<String>) -> Option<&str> {
        self.http_parts().and_then(|h| f(h).as_deref())
    }
}

impl ServletRequest for RecordedRequest {
    fn character_encoding(&self) -> Option<&str> {
        self.character_encoding.as_deref()
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn locale(&self) -> &str {
        &self.locale
    }

    fn parameter_names(&self) -> Vec<&str> {
        distinct_names(&self.parameters, exact)
    }

    fn parameter_values(&self, name: &str) -> Vec<&str> {
        values_of(&self.parameters, name, exact)
    }

    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    fn remote_host(&self) -> Option<&str> {
        self.remote_host.as_deref()
    }

    fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    fn server_port(&self) -> u16 {
        self.server_port
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn as_http(&self) -> Option<&dyn HttpRequest> {
        match self.http {
            Some(_) => Some(self),
            None => None,
        }
    }
}

impl HttpRequest for RecordedRequest {
    fn auth_type(&self) -> Option<&str> {
        self.http_field(|h| &h.auth_type)
    }

    fn context_path(&self) -> Option<&str> {
        self.http_field(|h| &h.context_path)
    }

    fn cookies(&self) -> &[Cookie] {
        self.http_parts().map(|h| h.cookies.as_slice()).unwrap_or(&[])
    }

    fn header_names(&self) -> Vec<&str> {
        self.http_parts()
            .map(|h| distinct_names(&h.headers, ignore_case))
            .unwrap_or_default()
    }

    fn headers(&self, name: &str) -> Vec<&str> {
        self.http_parts()
            .map(|h| values_of(&h.headers, name, ignore_case))
            .unwrap_or_default()
    }

    fn method(&self) -> Option<&str> {
        self.http_field(|h| &h.method)
    }

    fn path_info(&self) -> Option<&str> {
        self.http_field(|h| &h.path_info)
    }

    fn query_string(&self) -> Option<&str> {
        self.http_field(|h| &h.query_string)
    }

    fn remote_user(&self) -> Option<&str> {
        self.http_field(|h| &h.remote_user)
    }

    fn request_uri(&self) -> Option<&str> {
        self.http_field(|h| &h.request_uri)
    }

    fn requested_session_id(&self) -> Option<&str> {
        self.http_field(|h| &h.requested_session_id)
    }

    fn servlet_path(&self) -> Option<&str> {
        self.http_field(|h| &h.servlet_path)
    }
}

/// HTTP-only response attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpResponseParts {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie>,
    pub message: Option<String>,
}

impl Default for HttpResponseParts {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            cookies: Vec::new(),
            message: None,
        }
    }
}

/// A recorded response. Without `http` it only offers the base capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedResponse {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpResponseParts>,
}

impl RecordedResponse {
    /// A base-capability response.
    pub fn base() -> Self {
        Self::default()
    }

    /// An HTTP response with `status` and nothing else set.
    pub fn http(status: u16) -> Self {
        Self {
            http: Some(HttpResponseParts {
                status,
                ..HttpResponseParts::default()
            }),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Set the status. No-op on a base-capability response.
    pub fn set_status(&mut self, status: u16) {
        if let Some(http) = self.http.as_mut() {
            http.status = status;
        }
    }

    /// Add a header. No-op on a base-capability response.
    pub fn add_header(&mut self, name: &str, value: &str) {
        if let Some(http) = self.http.as_mut() {
            http.headers.push((name.to_string(), value.to_string()));
        }
    }

    /// A fresh response with the same capability, as the pipeline would
    /// receive it before doing any work.
    pub fn blank_like(&self) -> Self {
        match self.http {
            Some(_) => Self::http(200),
            None => Self::base(),
        }
    }
}

impl ServletResponse for RecordedResponse {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn as_http(&self) -> Option<&dyn HttpResponse> {
        match self.http {
            Some(_) => Some(self),
            None => None,
        }
    }
}

impl HttpResponse for RecordedResponse {
    fn status(&self) -> u16 {
        self.http.as_ref().map(|h| h.status).unwrap_or(200)
    }

    fn header_names(&self) -> Vec<&str> {
        self.http
            .as_ref()
            .map(|h| distinct_names(&h.headers, ignore_case))
            .unwrap_or_default()
    }

    fn headers(&self, name: &str) -> Vec<&str> {
        self.http
            .as_ref()
            .map(|h| values_of(&h.headers, name, ignore_case))
            .unwrap_or_default()
    }

    fn cookies(&self) -> &[Cookie] {
        self.http
            .as_ref()
            .map(|h| h.cookies.as_slice())
            .unwrap_or(&[])
    }

    fn message(&self) -> Option<&str> {
        self.http.as_ref().and_then(|h| h.message.as_deref())
    }
}

/// One recorded request/response exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedExchange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub request: RecordedRequest,
    pub response: RecordedResponse,
    /// When set, the replayed pipeline fails with this message instead of
    /// producing `response`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordedExchange {
    pub fn new(request: RecordedRequest, response: RecordedResponse) -> Self {
        Self {
            name: None,
            request,
            response,
            error: None,
        }
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// The response handed to the pipeline before it runs.
    pub fn initial_response(&self) -> RecordedResponse {
        self.response.blank_like()
    }

    /// Replay the pipeline stage: fill in the recorded response, or fail
    /// with the recorded error.
    pub fn run_pipeline(
        &self,
        _request: &RecordedRequest,
        response: &mut RecordedResponse,
    ) -> std::result::Result<(), PipelineError> {
        if let Some(ref message) = self.error {
            return Err(PipelineError(message.clone()));
        }
        *response = self.response.clone();
        Ok(())
    }
}

/// Load exchanges from a JSON file holding an array of exchanges.
pub fn load_exchanges<P: AsRef<Path>>(path: P) -> Result<Vec<RecordedExchange>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| CoreError::Exchange {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
