use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::args::{TesterArgs, default_markdown_path, default_result_dir};
use crate::error::{AppError, AppResult, ConfigError};
use crate::http::{EndpointConfig, RequestOptions};
use crate::metrics::ResponseMode;

/// Which prompt files the dataset directory is read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSourceKind {
    /// `*.csv` files with the prompt in the third column.
    Csv,
    /// `*.json` chat request bodies.
    Json,
}

impl PromptSourceKind {
    #[must_use]
    pub const fn from_common_prompt(use_common_prompt: bool) -> Self {
        if use_common_prompt {
            Self::Csv
        } else {
            Self::Json
        }
    }
}

/// Resolved, immutable settings for one benchmark run.
#[derive(Debug, Clone)]
pub struct Settings {
    endpoint: EndpointConfig,
    mode: ResponseMode,
    temperature: f64,
    concurrent: Option<NonZeroUsize>,
    request_timeout: Duration,
    request_delay: Duration,
    prompt_source: PromptSourceKind,
    dataset_dir: PathBuf,
    output_markdown: PathBuf,
    result_dir: PathBuf,
}

impl Settings {
    /// Validates the merged arguments and fills in the stamped default paths
    /// relative to `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL or model is missing, or the base URL
    /// does not parse.
    pub fn from_args(args: &TesterArgs, stamp: &str, working_dir: &Path) -> AppResult<Self> {
        let base_url = non_blank(args.base_url.as_deref())
            .ok_or_else(|| AppError::config(ConfigError::MissingBaseUrl))?;
        Url::parse(base_url).map_err(|err| {
            AppError::config(ConfigError::InvalidBaseUrl {
                url: base_url.to_owned(),
                source: err,
            })
        })?;
        let model = non_blank(args.model.as_deref())
            .ok_or_else(|| AppError::config(ConfigError::MissingModel))?;

        let endpoint = EndpointConfig::new(
            base_url,
            args.api_key.clone(),
            model.to_owned(),
            args.api_version.clone(),
            args.verify_ssl,
        );

        let output_markdown = non_blank(args.output_markdown.as_deref()).map_or_else(
            || working_dir.join(default_markdown_path(stamp)),
            PathBuf::from,
        );
        let result_dir = non_blank(args.result_dir.as_deref()).map_or_else(
            || default_result_dir(working_dir, stamp),
            PathBuf::from,
        );

        Ok(Self {
            endpoint,
            mode: ResponseMode::from_streaming(args.streaming),
            temperature: args.temperature,
            concurrent: NonZeroUsize::new(args.concurrent),
            request_timeout: args.request_timeout,
            request_delay: args.request_delay,
            prompt_source: PromptSourceKind::from_common_prompt(args.use_common_prompt),
            dataset_dir: PathBuf::from(&args.dataset_dir),
            output_markdown,
            result_dir,
        })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    #[must_use]
    pub const fn mode(&self) -> ResponseMode {
        self.mode
    }

    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub const fn request_options(&self) -> RequestOptions {
        RequestOptions {
            temperature: self.temperature,
            mode: self.mode,
        }
    }

    /// Concurrency limit, or `None` when the concurrent test is disabled.
    #[must_use]
    pub const fn concurrent(&self) -> Option<NonZeroUsize> {
        self.concurrent
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub const fn request_delay(&self) -> Duration {
        self.request_delay
    }

    #[must_use]
    pub const fn prompt_source(&self) -> PromptSourceKind {
        self.prompt_source
    }

    #[must_use]
    pub fn dataset_dir(&self) -> &Path {
        &self.dataset_dir
    }

    #[must_use]
    pub fn output_markdown(&self) -> &Path {
        &self.output_markdown
    }

    #[must_use]
    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// `(setting, value)` rows for the report header. The API key is never
    /// included.
    #[must_use]
    pub fn report_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("base_url", self.endpoint.base_url().to_owned()),
            ("model", self.endpoint.model().to_owned()),
            (
                "api_version",
                self.endpoint.api_version().unwrap_or_default().to_owned(),
            ),
            ("verify_ssl", self.endpoint.verify_ssl().to_string()),
            ("use_streaming", self.mode.is_streaming().to_string()),
            (
                "concurrent",
                self.concurrent.map_or(0, NonZeroUsize::get).to_string(),
            ),
            (
                "request_delay_seconds",
                format_seconds(self.request_delay),
            ),
            ("request_timeout_seconds", format_seconds(self.request_timeout)),
            ("temperature", self.temperature.to_string()),
            (
                "use_common_prompt",
                (self.prompt_source == PromptSourceKind::Csv).to_string(),
            ),
            (
                "output_markdown_path",
                self.output_markdown.display().to_string(),
            ),
            ("result_dir", self.result_dir.display().to_string()),
            ("test_dataset_dir", self.dataset_dir.display().to_string()),
        ]
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn format_seconds(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.3}", secs)
    }
}
