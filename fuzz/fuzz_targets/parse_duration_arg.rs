#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let arg = llm_perf::fuzzing::parse_duration_arg_input(input);
        let value = llm_perf::fuzzing::parse_duration_value_input(input);
        debug_assert_eq!(arg.is_ok(), value.is_ok());
    }
});
