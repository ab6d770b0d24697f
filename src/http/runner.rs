use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::error::HttpError;
use crate::metrics::PerformanceMetric;

use super::client::build_client;
use super::executor::{RequestExecutor, RequestOptions};

const PROMPT_PREVIEW_CHARS: usize = 30;
const FAILURE_SAMPLE: usize = 3;

/// One request of a batch that did not produce a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Submission index of the prompt, when the task got far enough to report it.
    pub index: Option<usize>,
    pub error: String,
    pub timed_out: bool,
}

impl FailureRecord {
    fn from_error(index: usize, err: &HttpError) -> Self {
        Self {
            index: Some(index),
            error: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }
}

/// Successful metrics in submission order, plus what failed.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub metrics: Vec<PerformanceMetric>,
    pub failures: Vec<FailureRecord>,
}

impl BatchOutcome {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn timeout_count(&self) -> usize {
        self.failures.iter().filter(|failure| failure.timed_out).count()
    }
}

/// Issues prompts one at a time, pausing after each success.
#[derive(Debug, Clone)]
pub struct SequentialRunner {
    executor: RequestExecutor,
    request_delay: Duration,
}

impl SequentialRunner {
    #[must_use]
    pub const fn new(executor: RequestExecutor, request_delay: Duration) -> Self {
        Self {
            executor,
            request_delay,
        }
    }

    /// Runs every prompt in order. A failed request is recorded and the run
    /// moves on to the next prompt.
    ///
    /// # Errors
    ///
    /// Returns an error only when the HTTP client cannot be built.
    pub async fn run(
        &self,
        prompts: &[String],
        request_timeout: Duration,
        options: RequestOptions,
    ) -> Result<BatchOutcome, HttpError> {
        let client = build_client(self.executor.endpoint(), request_timeout, None)?;
        let mut outcome = BatchOutcome::default();
        let total = prompts.len();

        for (index, prompt) in prompts.iter().enumerate() {
            info!(
                "Processing prompt {}/{}: {}...",
                index.saturating_add(1),
                total,
                prompt_preview(prompt)
            );
            match self
                .executor
                .single_request(&client, prompt, options.temperature, options.mode)
                .await
            {
                Ok(metric) => {
                    info!("✓ {:.2} tokens/sec", metric.tokens_per_second());
                    outcome.metrics.push(metric);
                    if !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }
                }
                Err(err) => {
                    outcome.failures.push(FailureRecord::from_error(index, &err));
                }
            }
        }

        Ok(outcome)
    }
}

/// Fans a batch of prompts out over one shared client.
///
/// At most `limit` requests are in flight at once. The client keeps up to
/// `2 * limit` idle connections per host so finished requests hand their
/// connection to the next one.
#[derive(Debug, Clone)]
pub struct ConcurrencyRunner {
    executor: RequestExecutor,
}

impl ConcurrencyRunner {
    #[must_use]
    pub const fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Launches every prompt, waits for all of them to settle and partitions
    /// the results. One request failing never cancels its siblings.
    ///
    /// # Errors
    ///
    /// Returns an error only when the HTTP client cannot be built.
    pub async fn run(
        &self,
        prompts: &[String],
        limit: NonZeroUsize,
        request_timeout: Duration,
        options: RequestOptions,
    ) -> Result<BatchOutcome, HttpError> {
        let pool_max_idle = NonZeroUsize::new(limit.get().saturating_mul(2));
        let client = build_client(self.executor.endpoint(), request_timeout, pool_max_idle)?;
        let permits = Arc::new(Semaphore::new(limit.get()));

        info!(
            "Running {} requests with concurrency limit {}",
            prompts.len(),
            limit
        );

        let mut tasks = JoinSet::new();
        for (index, prompt) in prompts.iter().enumerate() {
            let executor = self.executor.clone();
            let client = client.clone();
            let permits = Arc::clone(&permits);
            let prompt = prompt.clone();
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails on shutdown.
                let _permit = permits.acquire_owned().await.ok();
                let result = executor
                    .single_request(&client, &prompt, options.temperature, options.mode)
                    .await;
                (index, result)
            });
        }

        let mut successes = Vec::with_capacity(prompts.len());
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(metric))) => successes.push((index, metric)),
                Ok((index, Err(err))) => failures.push(FailureRecord::from_error(index, &err)),
                Err(err) => failures.push(FailureRecord {
                    index: None,
                    error: format!("Request task failed: {}", err),
                    timed_out: false,
                }),
            }
        }

        successes.sort_by_key(|(index, _)| *index);
        failures.sort_by_key(|failure| failure.index);

        if !failures.is_empty() {
            warn!("{} requests failed", failures.len());
            for failure in failures.iter().take(FAILURE_SAMPLE) {
                warn!("  {}", failure.error);
            }
        }

        Ok(BatchOutcome {
            metrics: successes.into_iter().map(|(_, metric)| metric).collect(),
            failures,
        })
    }
}

fn prompt_preview(prompt: &str) -> String {
    prompt
        .chars()
        .take(PROMPT_PREVIEW_CHARS)
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect()
}
