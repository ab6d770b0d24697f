#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(duration) = llm_perf::fuzzing::parse_duration_value_input(input) {
            debug_assert!(!input.trim().is_empty());
            let again = llm_perf::fuzzing::parse_duration_value_input(&format!(" {} ", input));
            debug_assert_eq!(again.ok(), Some(duration));
        }
    }
});
