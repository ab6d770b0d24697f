use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{TesterArgs, parse_temperature};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies config-file values to options not set on the command line or
/// through the environment.
///
/// # Errors
///
/// Returns an error when a config value is out of range.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_explicit(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        args.base_url = Some(base_url);
    }

    if !is_explicit(matches, "api_key")
        && let Some(api_key) = config.api_key.clone()
    {
        args.api_key = api_key;
    }

    if !is_explicit(matches, "model")
        && let Some(model) = config.model.clone()
    {
        args.model = Some(model);
    }

    if !is_explicit(matches, "api_version")
        && let Some(api_version) = config.api_version.clone()
    {
        args.api_version = Some(api_version);
    }

    if !is_explicit(matches, "verify_ssl")
        && let Some(verify_ssl) = config.verify_ssl
    {
        args.verify_ssl = verify_ssl;
    }

    if !is_explicit(matches, "streaming")
        && let Some(streaming) = config.streaming
    {
        args.streaming = streaming;
    }

    if !is_explicit(matches, "concurrent")
        && let Some(concurrent) = config.concurrent
    {
        args.concurrent = concurrent;
    }

    if !is_explicit(matches, "request_delay")
        && let Some(delay) = config.request_delay.as_ref()
    {
        args.request_delay = to_duration(delay, "request_delay")?;
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        let timeout = to_duration(timeout, "timeout")?;
        if timeout.is_zero() {
            return Err(invalid_field("timeout", "must be > 0".to_owned()));
        }
        args.request_timeout = timeout;
    }

    if !is_explicit(matches, "temperature")
        && let Some(temperature) = config.temperature
    {
        args.temperature = parse_temperature(&temperature.to_string())
            .map_err(|err| invalid_field("temperature", err.to_string()))?;
    }

    if !is_explicit(matches, "use_common_prompt")
        && let Some(use_common_prompt) = config.use_common_prompt
    {
        args.use_common_prompt = use_common_prompt;
    }

    if !is_explicit(matches, "dataset_dir")
        && let Some(dataset_dir) = config.dataset_dir.clone()
    {
        args.dataset_dir = dataset_dir;
    }

    if !is_explicit(matches, "output_markdown")
        && let Some(output_markdown) = config.output_markdown.clone()
    {
        args.output_markdown = Some(output_markdown);
    }

    if !is_explicit(matches, "result_dir")
        && let Some(result_dir) = config.result_dir.clone()
    {
        args.result_dir = Some(result_dir);
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|reason| invalid_field(field, reason))
}

fn invalid_field(field: &'static str, reason: String) -> AppError {
    AppError::config(ConfigError::InvalidField { field, reason })
}
