#![no_main]

use dmlatency::latency::{parse_histogram, read_histogram_text, Unit, DEFAULT_MAX_HISTOGRAM_BYTES};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Bounded read, then parse at both scales; neither may panic
    if let Ok(text) = read_histogram_text(data, DEFAULT_MAX_HISTOGRAM_BYTES) {
        for unit in [Unit::Millis, Unit::Seconds] {
            if let Ok(set) = parse_histogram(&text, unit) {
                assert!(!set.records().is_empty());
            }
        }
    }
});
