use crate::error::MetricsError;
use crate::metrics::PerformanceMetric;

use super::types::{DistributionStats, FirstTokenStats, Summary, SummaryStatistics};

/// Reduces a finished batch of successful requests.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyBatch`] when `metrics` is empty; callers
/// check for at least one success before summarizing.
pub fn summarize(metrics: &[PerformanceMetric]) -> Result<SummaryStatistics, MetricsError> {
    if metrics.is_empty() {
        return Err(MetricsError::EmptyBatch);
    }

    let tokens_per_second: Vec<f64> = metrics
        .iter()
        .map(PerformanceMetric::tokens_per_second)
        .collect();
    let total_times: Vec<f64> = metrics.iter().map(PerformanceMetric::total_time).collect();
    let first_token_times: Vec<f64> = metrics
        .iter()
        .map(PerformanceMetric::time_to_first_token)
        .collect();

    let total_tokens: u64 = metrics.iter().map(PerformanceMetric::total_tokens).sum();
    let summary = Summary {
        total_requests: metrics.len(),
        successful_requests: metrics.len(),
        total_tokens,
        total_prompt_tokens: metrics.iter().map(PerformanceMetric::prompt_tokens).sum(),
        total_tokens_generated: metrics
            .iter()
            .map(PerformanceMetric::completion_tokens)
            .sum(),
        total_reasoning_tokens: metrics
            .iter()
            .map(PerformanceMetric::reasoning_tokens)
            .sum(),
        total_time_elapsed: round2(total_times.iter().sum()),
        average_tokens_per_request: round2(total_tokens as f64 / metrics.len() as f64),
    };

    Ok(SummaryStatistics {
        summary,
        tokens_per_second: distribution(&tokens_per_second),
        response_times: distribution(&total_times),
        time_to_first_token: first_token(&first_token_times),
    })
}

fn distribution(values: &[f64]) -> DistributionStats {
    let spread = Spread::of(values);
    DistributionStats {
        mean: round2(spread.mean),
        median: round2(spread.median),
        min: round2(spread.min),
        max: round2(spread.max),
        std_dev: round2(sample_std_dev(values, spread.mean)),
    }
}

fn first_token(values: &[f64]) -> FirstTokenStats {
    let spread = Spread::of(values);
    FirstTokenStats {
        mean: round2(spread.mean),
        median: round2(spread.median),
        min: round2(spread.min),
        max: round2(spread.max),
    }
}

struct Spread {
    mean: f64,
    median: f64,
    min: f64,
    max: f64,
}

impl Spread {
    /// Unrounded mean, median and bounds. `values` is non-empty.
    fn of(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        let middle = count / 2;
        let median = if count % 2 == 0 {
            match (sorted.get(middle.saturating_sub(1)), sorted.get(middle)) {
                (Some(low), Some(high)) => (low + high) / 2.0,
                (Some(value), None) | (None, Some(value)) => *value,
                (None, None) => 0.0,
            }
        } else {
            sorted.get(middle).copied().unwrap_or_default()
        };

        Self {
            mean: mean(values),
            median,
            min: sorted.first().copied().unwrap_or_default(),
            max: sorted.last().copied().unwrap_or_default(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected standard deviation, 0 for fewer than two values.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    let Some(degrees) = values.len().checked_sub(1).filter(|degrees| *degrees > 0) else {
        return 0.0;
    };
    let squared: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    (squared / degrees as f64).sqrt()
}

pub(super) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
