//! Fuzz target for dumper config parsing and validation.
//!
//! Arbitrary TOML must either fail to parse, fail validation with an
//! error, or build a policy. It must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rd_config::DumperConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = toml::from_str::<DumperConfig>(text) {
        let _ = config.build_policy();
    }
});
