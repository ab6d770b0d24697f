#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let records = llm_perf::fuzzing::parse_csv_input(input);
        for record in &records {
            debug_assert!(!record.is_empty());
        }
    }
});
