use std::time::Duration;

use crate::error::{AppError, AppResult, ValidationError};

const MAX_TEMPERATURE: f64 = 2.0;

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Reads `<seconds>[ms|s|m|h]` where the number may be fractional, so
/// `0.25`, `1.5s` and `250ms` are all valid. A bare number is seconds.
/// Zero is accepted; negative or overflowing values are not.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let unit_start = value
        .find(|ch: char| ch.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(unit_start);
    let number: f64 = number
        .trim_end()
        .parse()
        .map_err(|err| format!("'{}' is not a number of seconds: {}", value, err))?;
    let seconds = match unit {
        "" | "s" => number,
        "ms" => number / 1000.0,
        "m" => number * 60.0,
        "h" => number * 3600.0,
        other => return Err(format!("unknown unit '{}' (use ms, s, m or h)", other)),
    };
    Duration::try_from_secs_f64(seconds).map_err(|err| format!("'{}' is out of range: {}", value, err))
}

/// Parses a CLI or environment duration, see [`parse_duration_value`].
pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(|reason| {
        AppError::validation(ValidationError::InvalidDuration {
            value: s.to_owned(),
            reason,
        })
    })
}

pub(crate) fn parse_timeout_arg(s: &str) -> AppResult<Duration> {
    let duration = parse_duration_arg(s)?;
    if duration.is_zero() {
        return Err(AppError::validation(ValidationError::InvalidDuration {
            value: s.to_owned(),
            reason: "timeout must be > 0".to_owned(),
        }));
    }
    Ok(duration)
}

pub(crate) fn parse_temperature(s: &str) -> AppResult<f64> {
    let invalid = || {
        AppError::validation(ValidationError::InvalidTemperature {
            value: s.to_owned(),
        })
    };
    let value: f64 = s.trim().parse().map_err(|_err| invalid())?;
    if !value.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&value) {
        return Err(invalid());
    }
    Ok(value)
}
