//! Core library for the `llm-perf` CLI.
//!
//! Benchmarks an OpenAI-compatible chat-completion endpoint: prompts are sent
//! one at a time and then concurrently, each response (buffered JSON or a
//! server-sent event stream) becomes a [`metrics::PerformanceMetric`], and
//! every batch is reduced by [`analysis::summarize`] into the statistics
//! written as a markdown report.
pub mod analysis;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod prompts;
pub mod report;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
