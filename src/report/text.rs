use std::fmt;

use super::Report;

const RULE_WIDTH: usize = 40;
const TABLE_RULE_WIDTH: usize = 100;

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Request ID | Total Tokens | Prompt Tokens | Completion Tokens | Reasoning Tokens | Total Time (s) | Tokens/Sec | Time to First Token (s)"
        )?;
        writeln!(f, "{}", "-".repeat(TABLE_RULE_WIDTH))?;
        for metric in self.metrics {
            writeln!(
                f,
                "{} | {} | {} | {} | {} | {:.2} | {:.2} | {:.2}",
                metric.request_id(),
                metric.total_tokens(),
                metric.prompt_tokens(),
                metric.completion_tokens(),
                metric.reasoning_tokens(),
                metric.total_time(),
                metric.tokens_per_second(),
                metric.time_to_first_token()
            )?;
        }

        write_block(f, "Summary:", &self.stats.summary.rows())?;
        write_block(f, "Tokens Per Second:", &self.stats.tokens_per_second.rows())?;
        write_block(f, "Response Times (s):", &self.stats.response_times.rows())?;
        write_block(
            f,
            "Time To First Token (s):",
            &self.stats.time_to_first_token.rows(),
        )?;

        if !self.failures.is_empty() {
            let rows = [
                ("Failed Requests", self.failures.len().to_string()),
                ("Timed Out", self.timeout_count().to_string()),
            ];
            write_block(f, "Failures:", &rows)?;
        }
        Ok(())
    }
}

fn write_block(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    rows: &[(&'static str, String)],
) -> fmt::Result {
    let rule = "-".repeat(RULE_WIDTH);
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", rule)?;
    for (name, value) in rows {
        writeln!(f, "{}: {}", name, value)?;
    }
    writeln!(f, "{}", rule)
}
