//! Rendering of a summarized batch as markdown or plain text, and writing
//! report files.
mod format;
mod markdown;
mod text;
mod writer;


use crate::analysis::SummaryStatistics;
use crate::http::FailureRecord;
use crate::metrics::PerformanceMetric;

pub use writer::{concurrent_report_path, write_report};

/// Everything a report shows for one batch. Rendering never recomputes a
/// statistic.
#[derive(Debug, Clone, Copy)]
pub struct Report<'run> {
    pub config_rows: &'run [(&'static str, String)],
    pub metrics: &'run [PerformanceMetric],
    pub stats: &'run SummaryStatistics,
    pub failures: &'run [FailureRecord],
}

impl Report<'_> {
    fn timeout_count(&self) -> usize {
        self.failures.iter().filter(|failure| failure.timed_out).count()
    }
}

/// Prompt size in KiB as shown in the per-request table.
#[must_use]
pub fn prompt_size_kb(prompt: &str) -> f64 {
    prompt.len() as f64 / 1024.0
}
