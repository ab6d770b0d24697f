use serde::Serialize;

/// Batch totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub total_tokens: u64,
    pub total_prompt_tokens: u64,
    pub total_tokens_generated: u64,
    pub total_reasoning_tokens: u64,
    pub total_time_elapsed: f64,
    pub average_tokens_per_request: f64,
}

/// Spread of one per-request measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; 0 for a single request.
    pub std_dev: f64,
}

/// Time-to-first-token spread. Carries no standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FirstTokenStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub summary: Summary,
    pub tokens_per_second: DistributionStats,
    pub response_times: DistributionStats,
    pub time_to_first_token: FirstTokenStats,
}

impl Summary {
    /// `(label, value)` pairs in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Requests", self.total_requests.to_string()),
            ("Successful Requests", self.successful_requests.to_string()),
            ("Total Tokens", self.total_tokens.to_string()),
            ("Total Prompt Tokens", self.total_prompt_tokens.to_string()),
            ("Total Tokens Generated", self.total_tokens_generated.to_string()),
            ("Total Reasoning Tokens", self.total_reasoning_tokens.to_string()),
            ("Total Time Elapsed", format_value(self.total_time_elapsed)),
            (
                "Average Tokens Per Request",
                format_value(self.average_tokens_per_request),
            ),
        ]
    }
}

impl DistributionStats {
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Mean", format_value(self.mean)),
            ("Median", format_value(self.median)),
            ("Min", format_value(self.min)),
            ("Max", format_value(self.max)),
            ("Std Dev", format_value(self.std_dev)),
        ]
    }
}

impl FirstTokenStats {
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Mean", format_value(self.mean)),
            ("Median", format_value(self.median)),
            ("Min", format_value(self.min)),
            ("Max", format_value(self.max)),
        ]
    }
}

fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}
