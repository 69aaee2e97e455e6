//! Fuzz target for redaction filters.
//!
//! Arbitrary patterns either fail to compile or produce a filter that
//! only ever returns the original value or the marker.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rd_redact::{FieldClass, RedactionPolicy, REDACTED_MARKER};

#[derive(Arbitrary, Debug)]
struct Input {
    pattern: String,
    name: String,
    value: String,
}

fuzz_target!(|input: Input| {
    let policy = RedactionPolicy::unfiltered();
    if policy.set_filter(FieldClass::Cookie, &input.pattern).is_err() {
        assert_eq!(policy.pattern(FieldClass::Cookie), None);
        return;
    }
    let out = policy.apply(FieldClass::Cookie, &input.name, &input.value);
    assert!(out == input.value || out == REDACTED_MARKER);
    if input.value.is_empty() {
        assert_eq!(out, "");
    }
    assert_eq!(
        policy.apply(FieldClass::Parameter, &input.name, &input.value),
        input.value
    );
});
