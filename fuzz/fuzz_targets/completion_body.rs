#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((_usage, request_id)) = llm_perf::fuzzing::parse_completion_input(data) {
        debug_assert!(serde_json::from_slice::<serde_json::Value>(data).is_ok());
        debug_assert!(!request_id.is_empty() || data.windows(4).any(|window| window == b"\"id\""));
    }
});
