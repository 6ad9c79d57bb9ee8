#![no_main]

use libfuzzer_sys::fuzz_target;
use rtstats::procfs::{parse_stat, parse_uptime};

fuzz_target!(|data: &[u8]| {
    // Procfs contents are not guaranteed to be well formed; neither parser
    // may panic on any input
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = parse_stat(input);
        let _ = parse_uptime(input);
    }
});
