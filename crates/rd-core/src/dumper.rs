//! The transaction dumper.
//!
//! For each transaction the dumper logs the request attributes, invokes the
//! next stage of the pipeline exactly once, and, if that stage succeeds,
//! logs the response attributes. Cookie, header and parameter values pass
//! through the [`RedactionPolicy`] before they are written.
//!
//! Whether the request and response offer the HTTP capability is decided
//! once per transaction. Fields that need it are logged as
//! [`NON_HTTP_REQUEST`] / [`NON_HTTP_RESPONSE`] when it is missing.

use std::sync::Arc;

use rd_config::{DumperConfig, TimestampZone};
use rd_redact::{FieldClass, RedactionPolicy};

use crate::record::{
    labels, name_value, AttributeRecord, ABSENT, NON_HTTP_REQUEST, NON_HTTP_RESPONSE,
};
use crate::sink::{LogSink, TracingSink};
use crate::timestamp::TimestampCache;
use crate::transaction::{HttpRequest, ServletRequest, ServletResponse};

/// Per-execution-context dump state.
///
/// Each worker thread (or task) owns one context and passes it to every
/// [`RequestDumper::dump`] call it makes. The context id prefixes every
/// line so interleaved dumps can be told apart.
#[derive(Debug, Clone)]
pub struct DumpContext {
    id: String,
    timestamp: TimestampCache,
}

impl DumpContext {
    pub fn new(id: impl Into<String>, zone: TimestampZone) -> Self {
        Self {
            id: id.into(),
            timestamp: TimestampCache::new(zone),
        }
    }

    /// A context named after the current thread.
    pub fn for_current_thread(zone: TimestampZone) -> Self {
        let thread = std::thread::current();
        let id = match thread.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", thread.id()),
        };
        Self::new(id, zone)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The cached formatted current time.
    pub fn timestamp(&mut self) -> &str {
        self.timestamp.current()
    }

    pub fn timestamp_cache(&mut self) -> &mut TimestampCache {
        &mut self.timestamp
    }
}

/// Request/response attribute dumper.
pub struct RequestDumper<S = TracingSink> {
    policy: Arc<RedactionPolicy>,
    sink: S,
    zone: TimestampZone,
    extended_response: bool,
}

impl RequestDumper<TracingSink> {
    /// A dumper with the default policy, logging through `tracing`.
    pub fn with_defaults() -> Self {
        RequestDumper::new(Arc::new(RedactionPolicy::default()), TracingSink)
    }
}

impl<S: LogSink> RequestDumper<S> {
    pub fn new(policy: Arc<RedactionPolicy>, sink: S) -> Self {
        Self {
            policy,
            sink,
            zone: TimestampZone::default(),
            extended_response: false,
        }
    }

    /// Build a dumper from configuration. Every filter is compiled here;
    /// an invalid pattern fails before any transaction is dumped.
    pub fn from_config(config: &DumperConfig, sink: S) -> rd_config::Result<Self> {
        let policy = config.build_policy()?;
        Ok(Self {
            policy: Arc::new(policy),
            sink,
            zone: config.zone(),
            extended_response: config.extended(),
        })
    }

    pub fn with_zone(mut self, zone: TimestampZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_extended_response(mut self, enabled: bool) -> Self {
        self.extended_response = enabled;
        self
    }

    pub fn policy(&self) -> &Arc<RedactionPolicy> {
        &self.policy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Apply new filters to the live policy. Transactions in flight keep
    /// the filter snapshot they already loaded.
    pub fn reconfigure(&self, config: &DumperConfig) -> rd_config::Result<()> {
        config.apply_to(&self.policy)
    }

    /// A new execution context using this dumper's timestamp zone.
    pub fn context(&self, id: impl Into<String>) -> DumpContext {
        DumpContext::new(id, self.zone)
    }

    /// Dump `request`, run `next`, then dump `response`.
    ///
    /// An error from `next` is returned unchanged and the response block
    /// is not written; the request block already logged stays in place.
    pub fn dump<Rq, Rs, E, F>(
        &self,
        ctx: &mut DumpContext,
        request: &Rq,
        response: &mut Rs,
        next: F,
    ) -> Result<(), E>
    where
        Rq: ServletRequest + ?Sized,
        Rs: ServletResponse + ?Sized,
        F: FnOnce(&Rq, &mut Rs) -> Result<(), E>,
    {
        let pre = self.request_record(ctx, request);
        self.emit(ctx, &pre);

        next(request, &mut *response)?;

        let post = self.response_record(ctx, request, response);
        self.emit(ctx, &post);
        Ok(())
    }

    fn emit(&self, ctx: &DumpContext, record: &AttributeRecord) {
        for line in record.lines(ctx.id()) {
            self.sink.write_line(&line);
        }
    }

    /// Build the pre-processing block for `request`.
    pub fn request_record<Rq>(&self, ctx: &mut DumpContext, request: &Rq) -> AttributeRecord
    where
        Rq: ServletRequest + ?Sized,
    {
        let http = request.as_http();
        let mut record = AttributeRecord::new();

        record.push(labels::START_TIME, ctx.timestamp());

        match http {
            Some(h) => {
                record.push_opt(labels::REQUEST_URI, h.request_uri());
                record.push_opt(labels::AUTH_TYPE, h.auth_type());
            }
            None => {
                record.push(labels::REQUEST_URI, NON_HTTP_REQUEST);
                record.push(labels::AUTH_TYPE, NON_HTTP_REQUEST);
            }
        }

        record.push_opt(labels::CHARACTER_ENCODING, request.character_encoding());
        record.push(labels::CONTENT_LENGTH, render_length(request.content_length()));
        record.push_opt(labels::CONTENT_TYPE, request.content_type());

        match http {
            Some(h) => {
                record.push_opt(labels::CONTEXT_PATH, h.context_path());
                self.push_request_cookies(&mut record, h);
                self.push_request_headers(&mut record, h);
            }
            None => {
                record.push(labels::CONTEXT_PATH, NON_HTTP_REQUEST);
                record.push(labels::COOKIE, NON_HTTP_REQUEST);
                record.push(labels::HEADER, NON_HTTP_REQUEST);
            }
        }

        record.push(labels::LOCALE, request.locale());

        match http {
            Some(h) => record.push_opt(labels::METHOD, h.method()),
            None => record.push(labels::METHOD, NON_HTTP_REQUEST),
        }

        self.push_parameters(&mut record, request);

        match http {
            Some(h) => record.push_opt(labels::PATH_INFO, h.path_info()),
            None => record.push(labels::PATH_INFO, NON_HTTP_REQUEST),
        }

        record.push_opt(labels::PROTOCOL, request.protocol());

        match http {
            Some(h) => record.push_opt(labels::QUERY_STRING, h.query_string()),
            None => record.push(labels::QUERY_STRING, NON_HTTP_REQUEST),
        }

        record.push_opt(labels::REMOTE_ADDR, request.remote_addr());
        record.push_opt(labels::REMOTE_HOST, request.remote_host());

        match http {
            Some(h) => {
                record.push_opt(labels::REMOTE_USER, h.remote_user());
                record.push_opt(labels::REQUESTED_SESSION_ID, h.requested_session_id());
            }
            None => {
                record.push(labels::REMOTE_USER, NON_HTTP_REQUEST);
                record.push(labels::REQUESTED_SESSION_ID, NON_HTTP_REQUEST);
            }
        }

        record.push_opt(labels::SCHEME, request.scheme());
        record.push_opt(labels::SERVER_NAME, request.server_name());
        record.push(labels::SERVER_PORT, request.server_port().to_string());

        match http {
            Some(h) => record.push_opt(labels::SERVLET_PATH, h.servlet_path()),
            None => record.push(labels::SERVLET_PATH, NON_HTTP_REQUEST),
        }

        record.push(labels::IS_SECURE, request.is_secure().to_string());
        record.push_separator();
        record
    }

    /// Build the post-processing block for `request` / `response`.
    pub fn response_record<Rq, Rs>(
        &self,
        ctx: &mut DumpContext,
        request: &Rq,
        response: &Rs,
    ) -> AttributeRecord
    where
        Rq: ServletRequest + ?Sized,
        Rs: ServletResponse + ?Sized,
    {
        let http_request = request.as_http();
        let http_response = response.as_http();
        let mut record = AttributeRecord::new();

        record.push_separator();

        match http_request {
            Some(h) => record.push_opt(labels::AUTH_TYPE, h.auth_type()),
            None => record.push(labels::AUTH_TYPE, NON_HTTP_REQUEST),
        }

        if self.extended_response {
            record.push(labels::CONTENT_LENGTH, render_length(response.content_length()));
        }

        record.push_opt(labels::CONTENT_TYPE, response.content_type());

        if self.extended_response {
            match http_response {
                Some(h) => {
                    for cookie in h.cookies() {
                        let value =
                            self.policy
                                .apply(FieldClass::Cookie, &cookie.name, &cookie.value);
                        record.push(
                            labels::COOKIE,
                            format!(
                                "{}; domain={}; path={}",
                                name_value(&cookie.name, value),
                                cookie.domain.as_deref().unwrap_or(ABSENT),
                                cookie.path.as_deref().unwrap_or(ABSENT),
                            ),
                        );
                    }
                }
                None => record.push(labels::COOKIE, NON_HTTP_RESPONSE),
            }
        }

        match http_response {
            Some(h) => {
                for name in h.header_names() {
                    for value in h.headers(name) {
                        let value = self.policy.apply(FieldClass::ResponseHeader, name, value);
                        record.push(labels::HEADER, name_value(name, value));
                    }
                }
            }
            None => record.push(labels::HEADER, NON_HTTP_RESPONSE),
        }

        if self.extended_response {
            match http_response {
                Some(h) => record.push_opt(labels::MESSAGE, h.message()),
                None => record.push(labels::MESSAGE, NON_HTTP_RESPONSE),
            }
        }

        match http_request {
            Some(h) => record.push_opt(labels::REMOTE_USER, h.remote_user()),
            None => record.push(labels::REMOTE_USER, NON_HTTP_REQUEST),
        }

        match http_response {
            Some(h) => record.push(labels::STATUS, h.status().to_string()),
            None => record.push(labels::STATUS, NON_HTTP_RESPONSE),
        }

        record.push(labels::END_TIME, ctx.timestamp());
        record.push_terminator();
        record
    }

    fn push_request_cookies(&self, record: &mut AttributeRecord, request: &dyn HttpRequest) {
        for cookie in request.cookies() {
            let value = self
                .policy
                .apply(FieldClass::Cookie, &cookie.name, &cookie.value);
            record.push(labels::COOKIE, name_value(&cookie.name, value));
        }
    }

    fn push_request_headers(&self, record: &mut AttributeRecord, request: &dyn HttpRequest) {
        for name in request.header_names() {
            for value in request.headers(name) {
                let value = self.policy.apply(FieldClass::RequestHeader, name, value);
                record.push(labels::HEADER, name_value(name, value));
            }
        }
    }

    fn push_parameters<Rq>(&self, record: &mut AttributeRecord, request: &Rq)
    where
        Rq: ServletRequest + ?Sized,
    {
        for name in request.parameter_names() {
            let values: Vec<&str> = request
                .parameter_values(name)
                .into_iter()
                .map(|value| self.policy.apply(FieldClass::Parameter, name, value))
                .collect();
            record.push(labels::PARAMETER, name_value(name, &values.join(", ")));
        }
    }
}

/// Content lengths render as `-1` when unknown.
fn render_length(length: Option<u64>) -> String {
    match length {
        Some(n) => n.to_string(),
        None => "-1".to_string(),
    }
}
