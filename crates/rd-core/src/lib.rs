//! Request Dumper Core Library
//!
//! Logs the attributes of each request before it is processed and of its
//! response afterwards, masking sensitive cookie, header and parameter
//! values on the way:
//! - Transaction capability traits ([`ServletRequest`], [`HttpRequest`], ...)
//! - The [`RequestDumper`] and its per-context [`DumpContext`]
//! - Log sinks and logging setup
//! - Recorded exchanges and replay for the `reqdump` CLI
//!
//! ```
//! use std::sync::Arc;
//! use rd_core::{MemorySink, RecordedRequest, RecordedResponse, RequestDumper};
//! use rd_redact::RedactionPolicy;
//!
//! let dumper = RequestDumper::new(Arc::new(RedactionPolicy::default()), MemorySink::new());
//! let mut ctx = dumper.context("exec-1");
//! let request = RecordedRequest::http_get("/login").with_parameter("password", "hunter2");
//! let mut response = RecordedResponse::http(200);
//!
//! dumper
//!     .dump(&mut ctx, &request, &mut response, |_, _| Ok::<(), ()>(()))
//!     .unwrap();
//! assert!(dumper
//!     .sink()
//!     .lines()
//!     .contains(&"exec-1          parameter=password=XXXXXX".to_string()));
//! ```

pub mod dumper;
pub mod error;
pub mod exit_codes;
pub mod fixture;
pub mod logging;
pub mod record;
pub mod replay;
pub mod sink;
pub mod timestamp;
pub mod transaction;

pub use dumper::{DumpContext, RequestDumper};
pub use error::{CoreError, Result};
pub use exit_codes::ExitCode;
pub use fixture::{
    load_exchanges, PipelineError, RecordedExchange, RecordedRequest, RecordedResponse,
};
pub use record::{AttributeRecord, NON_HTTP_REQUEST, NON_HTTP_RESPONSE};
pub use replay::{replay, ReplaySummary};
pub use sink::{LogSink, MemorySink, TracingSink, WriterSink, DUMP_TARGET};
pub use timestamp::TimestampCache;
pub use transaction::{Cookie, HttpRequest, HttpResponse, ServletRequest, ServletResponse};
