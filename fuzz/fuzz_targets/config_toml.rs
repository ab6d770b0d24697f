#![no_main]

use libfuzzer_sys::fuzz_target;
use llm_perf::config::types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let parsed: Option<ConfigFile> = toml::from_str(input).ok();
        if let Ok(args) = llm_perf::fuzzing::apply_config_from_toml(input) {
            debug_assert!(!args.request_timeout.is_zero());
            if let Some(config) = parsed {
                if let Some(temperature) = config.temperature {
                    debug_assert!((0.0..=2.0).contains(&temperature));
                }
            }
        }
    }
});
