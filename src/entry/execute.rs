use std::path::Path;

use tracing::{error, info, warn};

use crate::analysis::summarize;
use crate::config::Settings;
use crate::error::AppResult;
use crate::http::{BatchOutcome, ConcurrencyRunner, RequestExecutor, SequentialRunner};
use crate::prompts::source_for;
use crate::report::{Report, concurrent_report_path, write_report};

pub(super) async fn run_tests(settings: &Settings) -> AppResult<()> {
    let prompts = source_for(settings.prompt_source(), settings.dataset_dir())
        .load()
        .await?;
    if prompts.is_empty() {
        warn!(
            "No test prompts found in {}. Nothing to run.",
            settings.dataset_dir().display()
        );
        return Ok(());
    }
    info!("Loaded {} test prompts", prompts.len());

    let endpoint = settings.endpoint();
    info!("Testing endpoint: {}", endpoint.completions_url());
    info!("Model: {}", endpoint.model());
    info!(
        "SSL verification: {}",
        if endpoint.verify_ssl() { "enabled" } else { "disabled" }
    );
    info!(
        "Streaming: {}",
        if settings.mode().is_streaming() {
            "enabled"
        } else {
            "disabled"
        }
    );

    let config_rows = settings.report_rows();
    let executor = RequestExecutor::new(
        endpoint.clone(),
        Some(settings.result_dir().to_path_buf()),
    );

    info!("=== Test 1: Sequential Requests ===");
    let sequential = SequentialRunner::new(executor.clone(), settings.request_delay())
        .run(
            &prompts,
            settings.request_timeout(),
            settings.request_options(),
        )
        .await?;
    report_batch(&sequential, &config_rows, settings.output_markdown()).await;

    if let Some(limit) = settings.concurrent() {
        info!("=== Test 2: Concurrent Requests (limit {}) ===", limit);
        let batch: Vec<String> = prompts.iter().chain(prompts.iter()).cloned().collect();
        let concurrent = ConcurrencyRunner::new(executor)
            .run(
                &batch,
                limit,
                settings.request_timeout(),
                settings.request_options(),
            )
            .await?;
        let path = concurrent_report_path(settings.output_markdown());
        report_batch(&concurrent, &config_rows, &path).await;
    }

    info!("Performance test completed!");
    Ok(())
}

/// Logs and writes the report of one batch. Report failures are logged only.
async fn report_batch(outcome: &BatchOutcome, config_rows: &[(&'static str, String)], path: &Path) {
    if outcome.metrics.is_empty() {
        warn!(
            "No successful requests ({} failed); skipping report {}",
            outcome.failure_count(),
            path.display()
        );
        return;
    }

    let stats = match summarize(&outcome.metrics) {
        Ok(stats) => stats,
        Err(err) => {
            error!("Failed to summarize results: {}", err);
            return;
        }
    };
    let report = Report {
        config_rows,
        metrics: &outcome.metrics,
        stats: &stats,
        failures: &outcome.failures,
    };
    info!("\n{}", report);

    let markdown = match report.to_markdown() {
        Ok(markdown) => markdown,
        Err(err) => {
            error!("Failed to render markdown report: {}", err);
            return;
        }
    };
    info!("\n{}", markdown);

    match write_report(path, &markdown).await {
        Ok(()) => info!("Markdown report saved to {}", path.display()),
        Err(err) => error!("{}", err),
    }
}
