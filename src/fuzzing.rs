//! Entry points for the `fuzz/` targets. Compiled only with the `fuzzing`
//! feature.
use std::time::Duration;

use bytes::Bytes;
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tokio::time::Instant;

use crate::args::TesterArgs;
use crate::args::parsers::{parse_duration_arg, parse_duration_value};
use crate::config::apply_config;
use crate::config::types::ConfigFile;
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::{
    MAX_LINE_BYTES, PerformanceMetric, TokenUsage, parse_completion, read_event_stream,
};

thread_local! {
    static BASE_MATCHES: ArgMatches = TesterArgs::command().get_matches_from(["llm-perf"]);
}

/// Replays `data` as a streamed response body cut into `chunk_len` pieces
/// and returns the finished metric and content.
///
/// # Errors
///
/// Returns an error when the runtime cannot start or the stream is rejected.
pub fn parse_stream_input(data: &[u8], chunk_len: usize) -> AppResult<(PerformanceMetric, String)> {
    let chunks: Vec<reqwest::Result<Bytes>> = data
        .chunks(chunk_len.max(1))
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let built = runtime.block_on(read_event_stream(
        futures_util::stream::iter(chunks),
        Instant::now(),
        "fuzz",
        MAX_LINE_BYTES,
    ))?;
    Ok(built)
}

/// Parses a buffered completion body.
///
/// # Errors
///
/// Returns an error when the body is not a usable completion.
pub fn parse_completion_input(body: &[u8]) -> AppResult<(TokenUsage, String)> {
    let parsed = parse_completion(body)?;
    Ok((parsed.usage, parsed.request_id))
}

/// Parses a duration argument (e.g. `10s`, `500ms`).
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_arg_input(input: &str) -> AppResult<Duration> {
    parse_duration_arg(input)
}

/// Parses a duration value from config.
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_value_input(input: &str) -> AppResult<Duration> {
    parse_duration_value(input).map_err(|reason| {
        AppError::validation(ValidationError::InvalidDuration {
            value: input.to_owned(),
            reason,
        })
    })
}

/// Splits CSV text into records.
#[must_use]
pub fn parse_csv_input(input: &str) -> Vec<Vec<String>> {
    crate::prompts::parse_records(input)
}

/// Parses TOML config and applies it to default arguments.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<TesterArgs> {
    let config: ConfigFile = toml::from_str(input).map_err(|err| {
        AppError::config(crate::error::ConfigError::ParseToml {
            path: "fuzz.toml".into(),
            source: err,
        })
    })?;
    apply_config_to_defaults(&config)
}

/// Parses JSON config and applies it to default arguments.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_json(input: &[u8]) -> AppResult<TesterArgs> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    apply_config_to_defaults(&config)
}

fn apply_config_to_defaults(config: &ConfigFile) -> AppResult<TesterArgs> {
    BASE_MATCHES.with(|matches| {
        let mut args = TesterArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)?;
        Ok(args)
    })
}
