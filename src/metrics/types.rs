use std::time::Duration;

use serde::Serialize;

/// Request id recorded when the server does not assign one.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Token counters taken from a response `usage` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub reasoning_tokens: u64,
}

/// Measurements for one completed request.
///
/// Built once by a [`MetricsBuilder`](super::MetricsBuilder) and read-only
/// afterwards. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetric {
    total_tokens: u64,
    prompt_tokens: u64,
    completion_tokens: u64,
    reasoning_tokens: u64,
    total_time: f64,
    tokens_per_second: f64,
    time_to_first_token: f64,
    request_id: String,
    prompt: String,
}

impl PerformanceMetric {
    /// Derives throughput from `usage` and `total_time`.
    ///
    /// `time_to_first_token` is clamped to `total_time`.
    #[must_use]
    pub fn new(
        usage: TokenUsage,
        total_time: Duration,
        time_to_first_token: Duration,
        request_id: String,
        prompt: String,
    ) -> Self {
        let total_secs = total_time.as_secs_f64();
        let first_token_secs = time_to_first_token.min(total_time).as_secs_f64();
        let tokens_per_second = if total_secs > 0.0 {
            usage.total_tokens as f64 / total_secs
        } else {
            0.0
        };

        Self {
            total_tokens: usage.total_tokens,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            reasoning_tokens: usage.reasoning_tokens,
            total_time: total_secs,
            tokens_per_second,
            time_to_first_token: first_token_secs,
            request_id,
            prompt,
        }
    }

    #[must_use]
    pub const fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    #[must_use]
    pub const fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens
    }

    #[must_use]
    pub const fn completion_tokens(&self) -> u64 {
        self.completion_tokens
    }

    #[must_use]
    pub const fn reasoning_tokens(&self) -> u64 {
        self.reasoning_tokens
    }

    #[must_use]
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    #[must_use]
    pub const fn tokens_per_second(&self) -> f64 {
        self.tokens_per_second
    }

    #[must_use]
    pub const fn time_to_first_token(&self) -> f64 {
        self.time_to_first_token
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}
