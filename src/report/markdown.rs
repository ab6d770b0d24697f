use crate::error::SinkError;
use crate::metrics::PerformanceMetric;

use super::format::{separator_row, table_row, write_line};
use super::{Report, prompt_size_kb};

const REQUEST_HEADERS: [&str; 9] = [
    "Request ID",
    "Prompt size(KB)",
    "Total tokens",
    "Prompt tokens",
    "Completion tokens",
    "Reasoning tokens",
    "Total Time (s)",
    "Tokens/Sec",
    "TTFT (s)",
];

impl Report<'_> {
    /// Full markdown document: configuration, per-request table, the four
    /// statistics tables and, when requests failed, a failure table.
    ///
    /// # Errors
    ///
    /// Returns an error when writing into the output buffer fails.
    pub fn to_markdown(&self) -> Result<String, SinkError> {
        let mut output = String::new();

        write_line(&mut output, "### Test Configuration")?;
        write_line(&mut output, "| Setting | Value |")?;
        write_line(&mut output, "|---------|-------|")?;
        for (key, value) in self.config_rows {
            write_line(&mut output, &table_row([*key, value.as_str()]))?;
        }
        write_line(&mut output, "")?;

        if !self.metrics.is_empty() {
            write_line(&mut output, "### Per-Request Metrics")?;
            write_line(&mut output, &table_row(REQUEST_HEADERS))?;
            write_line(&mut output, &separator_row(REQUEST_HEADERS.len()))?;
            for metric in self.metrics {
                write_line(&mut output, &request_row(metric))?;
            }
            write_line(&mut output, "")?;
        }

        write_stats_table(&mut output, "Summary", &self.stats.summary.rows())?;
        write_stats_table(
            &mut output,
            "Tokens / Second Stats",
            &self.stats.tokens_per_second.rows(),
        )?;
        write_stats_table(
            &mut output,
            "Response Time Stats (s)",
            &self.stats.response_times.rows(),
        )?;
        write_stats_table(
            &mut output,
            "Time To First Token (s)",
            &self.stats.time_to_first_token.rows(),
        )?;

        if !self.failures.is_empty() {
            let rows = [
                ("Failed Requests", self.failures.len().to_string()),
                ("Timed Out", self.timeout_count().to_string()),
            ];
            write_stats_table(&mut output, "Failures", &rows)?;
        }

        Ok(output)
    }
}

fn request_row(metric: &PerformanceMetric) -> String {
    table_row([
        metric.request_id().to_owned(),
        format!("{:.2}", prompt_size_kb(metric.prompt())),
        metric.total_tokens().to_string(),
        metric.prompt_tokens().to_string(),
        metric.completion_tokens().to_string(),
        metric.reasoning_tokens().to_string(),
        format!("{:.2}", metric.total_time()),
        format!("{:.2}", metric.tokens_per_second()),
        format!("{:.2}", metric.time_to_first_token()),
    ])
}

fn write_stats_table(
    output: &mut String,
    title: &str,
    rows: &[(&'static str, String)],
) -> Result<(), SinkError> {
    write_line(output, &format!("### {}", title))?;
    write_line(output, "| Metric | Value |")?;
    write_line(output, "|---|---|")?;
    for (name, value) in rows {
        write_line(output, &table_row([*name, value.as_str()]))?;
    }
    write_line(output, "")
}
