//! Attribute records and line formatting.
//!
//! A record is the ordered list of `(label, value)` pairs dumped for one
//! side of a transaction. Labels are padded to a common width so the `=`
//! signs line up in the log.

/// Value used for fields that need the HTTP request capability.
pub const NON_HTTP_REQUEST: &str = "Not available. Non-http request.";

/// Value used for fields that need the HTTP response capability.
pub const NON_HTTP_RESPONSE: &str = "Not available. Non-http response.";

/// Rendering of an absent value.
pub const ABSENT: &str = "null";

/// Fixed-width labels, in dump order.
pub mod labels {
    pub const START_TIME: &str = "START TIME        ";
    pub const REQUEST_URI: &str = "        requestURI";
    pub const AUTH_TYPE: &str = "          authType";
    pub const CHARACTER_ENCODING: &str = " characterEncoding";
    pub const CONTENT_LENGTH: &str = "     contentLength";
    pub const CONTENT_TYPE: &str = "       contentType";
    pub const CONTEXT_PATH: &str = "       contextPath";
    pub const COOKIE: &str = "            cookie";
    pub const HEADER: &str = "            header";
    pub const LOCALE: &str = "            locale";
    pub const METHOD: &str = "            method";
    pub const PARAMETER: &str = "         parameter";
    pub const PATH_INFO: &str = "          pathInfo";
    pub const PROTOCOL: &str = "          protocol";
    pub const QUERY_STRING: &str = "       queryString";
    pub const REMOTE_ADDR: &str = "        remoteAddr";
    pub const REMOTE_HOST: &str = "        remoteHost";
    pub const REMOTE_USER: &str = "        remoteUser";
    pub const REQUESTED_SESSION_ID: &str = "requestedSessionId";
    pub const SCHEME: &str = "            scheme";
    pub const SERVER_NAME: &str = "        serverName";
    pub const SERVER_PORT: &str = "        serverPort";
    pub const SERVLET_PATH: &str = "       servletPath";
    pub const IS_SECURE: &str = "          isSecure";
    pub const MESSAGE: &str = "           message";
    pub const STATUS: &str = "            status";
    pub const END_TIME: &str = "END TIME          ";

    pub const SEPARATOR: &str = "------------------";
    pub const SEPARATOR_VALUE: &str = "--------------------------------------------";
    pub const TERMINATOR: &str = "==================";
    pub const TERMINATOR_VALUE: &str = "============================================";

    /// Width every label is padded to.
    pub const WIDTH: usize = 18;
}

/// One formatted block of a transaction dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRecord {
    entries: Vec<(&'static str, String)>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: &'static str, value: impl Into<String>) {
        self.entries.push((label, value.into()));
    }

    /// Push an optional value, rendering `None` as [`ABSENT`].
    pub fn push_opt(&mut self, label: &'static str, value: Option<&str>) {
        self.push(label, value.unwrap_or(ABSENT));
    }

    pub fn push_separator(&mut self) {
        self.push(labels::SEPARATOR, labels::SEPARATOR_VALUE);
    }

    pub fn push_terminator(&mut self) {
        self.push(labels::TERMINATOR, labels::TERMINATOR_VALUE);
    }

    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    /// Labels in order, trimmed of padding.
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(label, _)| label.trim()).collect()
    }

    /// Values recorded under `label` (trimmed label), in order.
    pub fn values(&self, label: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(l, _)| l.trim() == label)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render every entry as a log line for `context_id`.
    pub fn lines<'a>(&'a self, context_id: &'a str) -> impl Iterator<Item = String> + 'a {
        self.entries
            .iter()
            .map(move |(label, value)| format_line(context_id, label, value))
    }
}

/// Format one dump line: `<context-id> <label>=<value>`.
pub fn format_line(context_id: &str, label: &str, value: &str) -> String {
    let mut line = String::with_capacity(context_id.len() + label.len() + value.len() + 2);
    line.push_str(context_id);
    line.push(' ');
    line.push_str(label);
    line.push('=');
    line.push_str(value);
    line
}

/// Format a `name=value` sub-attribute (cookies, headers).
pub fn name_value(name: &str, value: &str) -> String {
    let mut s = String::with_capacity(name.len() + value.len() + 1);
    s.push_str(name);
    s.push('=');
    s.push_str(value);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_fixed_width() {
        let all = [
            labels::START_TIME,
            labels::REQUEST_URI,
            labels::AUTH_TYPE,
            labels::CHARACTER_ENCODING,
            labels::CONTENT_LENGTH,
            labels::CONTENT_TYPE,
            labels::CONTEXT_PATH,
            labels::COOKIE,
            labels::HEADER,
            labels::LOCALE,
            labels::METHOD,
            labels::PARAMETER,
            labels::PATH_INFO,
            labels::PROTOCOL,
            labels::QUERY_STRING,
            labels::REMOTE_ADDR,
            labels::REMOTE_HOST,
            labels::REMOTE_USER,
            labels::REQUESTED_SESSION_ID,
            labels::SCHEME,
            labels::SERVER_NAME,
            labels::SERVER_PORT,
            labels::SERVLET_PATH,
            labels::IS_SECURE,
            labels::MESSAGE,
            labels::STATUS,
            labels::END_TIME,
            labels::SEPARATOR,
            labels::TERMINATOR,
        ];
        for label in all {
            assert_eq!(label.len(), labels::WIDTH, "{:?}", label);
        }
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("worker-1", labels::METHOD, "GET"),
            "worker-1             method=GET"
        );
    }

    #[test]
    fn test_push_opt_renders_absent() {
        let mut record = AttributeRecord::new();
        record.push_opt(labels::PATH_INFO, None);
        record.push_opt(labels::PROTOCOL, Some("HTTP/1.1"));
        assert_eq!(record.values("pathInfo"), vec!["null"]);
        assert_eq!(record.values("protocol"), vec!["HTTP/1.1"]);
    }

    #[test]
    fn test_lines_in_order() {
        let mut record = AttributeRecord::new();
        record.push(labels::SCHEME, "https");
        record.push_separator();
        let lines: Vec<String> = record.lines("t").collect();
        assert_eq!(
            lines,
            vec![
                "t             scheme=https".to_string(),
                "t ------------------=--------------------------------------------".to_string(),
            ]
        );
    }
}
