//! Aggregation of a finished batch into summary statistics.
//!
//! [`summarize`] is the only entry point. Every value is rounded to two
//! decimals when the [`SummaryStatistics`] is built, so renderers print the
//! numbers as they are.
mod stats;
mod types;


pub use stats::summarize;
pub use types::{DistributionStats, FirstTokenStats, Summary, SummaryStatistics};
