#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, body)) = data.split_first() else {
        return;
    };
    let whole = llm_perf::fuzzing::parse_stream_input(body, usize::MAX);
    let chunked = llm_perf::fuzzing::parse_stream_input(body, usize::from(split));

    debug_assert_eq!(whole.is_ok(), chunked.is_ok());
    if let (Ok((metric, whole_content)), Ok((chunked, chunked_content))) = (whole, chunked) {
        debug_assert!(metric.time_to_first_token() <= metric.total_time());
        debug_assert!(metric.tokens_per_second() >= 0.0);
        debug_assert_eq!(metric.total_tokens(), chunked.total_tokens());
        debug_assert_eq!(metric.request_id(), chunked.request_id());
        debug_assert_eq!(whole_content, chunked_content);
    }
});
