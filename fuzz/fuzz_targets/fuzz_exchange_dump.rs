//! Fuzz target for recorded exchange parsing and dumping.
//!
//! Any exchange file that parses must dump without panicking.

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use rd_core::{replay, MemorySink, RecordedExchange, RequestDumper};
use rd_redact::RedactionPolicy;

fuzz_target!(|data: &[u8]| {
    let Ok(exchanges) = serde_json::from_slice::<Vec<RecordedExchange>>(data) else {
        return;
    };
    let dumper = RequestDumper::new(Arc::new(RedactionPolicy::default()), MemorySink::new());
    let summary = replay(&dumper, &exchanges, 1);
    assert_eq!(summary.total(), exchanges.len());

    assert!(!dumper.sink().lines().is_empty() || exchanges.is_empty());
});
