use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_bool_env, parse_duration_arg, parse_temperature, parse_timeout_arg};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Latency and throughput benchmark for OpenAI-compatible chat-completion endpoints."
)]
pub struct TesterArgs {
    /// Endpoint base URL; `/chat/completions` is appended
    #[arg(long = "base-url", env = "LLM_URL")]
    pub base_url: Option<String>,

    /// API key sent as a bearer token and as the `api-key` header
    #[arg(
        long = "api-key",
        env = "LLM_API_KEY",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub api_key: String,

    /// Model name placed in every request body
    #[arg(long, env = "LLM_MODEL")]
    pub model: Option<String>,

    /// Value of the `api-version` query parameter (Azure-style deployments)
    #[arg(long = "api-version", env = "LLM_API_VERSION")]
    pub api_version: Option<String>,

    /// Verify TLS certificates and hostnames
    #[arg(long = "verify-ssl", env = "LLM_VERIFY_SSL", value_parser = parse_bool_env)]
    pub verify_ssl: bool,

    /// Request streamed (server-sent event) responses
    #[arg(long = "streaming", env = "LLM_USE_STREAMING", value_parser = parse_bool_env)]
    pub streaming: bool,

    /// Concurrency limit for the concurrent test; 0 skips it
    #[arg(long = "concurrent", env = "LLM_CONCURRENT", default_value = "0")]
    pub concurrent: usize,

    /// Pause after each successful sequential request (supports ms/s/m/h)
    #[arg(
        long = "request-delay",
        env = "LLM_REQUEST_DELAY_SECONDS",
        default_value = "0",
        value_parser = parse_duration_arg
    )]
    pub request_delay: Duration,

    /// Per-request timeout, connect through last body byte (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        env = "LLM_REQUEST_TIMEOUT",
        default_value = "6000s",
        value_parser = parse_timeout_arg
    )]
    pub request_timeout: Duration,

    /// Sampling temperature (0 to 2)
    #[arg(
        long = "temperature",
        env = "LLM_TEMPERATURE",
        default_value = "0.0",
        value_parser = parse_temperature
    )]
    pub temperature: f64,

    /// Read prompts from CSV files instead of JSON request files
    #[arg(
        long = "use-common-prompt",
        env = "LLM_USE_COMMON_PROMPT",
        value_parser = parse_bool_env
    )]
    pub use_common_prompt: bool,

    /// Directory holding the prompt files
    #[arg(long = "dataset-dir", env = "LLM_TEST_DATASET_DIR", default_value = ".")]
    pub dataset_dir: String,

    /// Markdown report path (defaults to ./analysis/analysis_<timestamp>.md)
    #[arg(long = "output-markdown", env = "LLM_OUTPUT_MARKDOWN_PATH")]
    pub output_markdown: Option<String>,

    /// Directory for raw response bodies (defaults to ./analysis_<timestamp>)
    #[arg(long = "result-dir", env = "LLM_RESULT_DIR")]
    pub result_dir: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./llm-perf.toml or ./llm-perf.json if present.
    #[arg(long, env = "LLM_PERF_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by LLM_PERF_LOG/RUST_LOG/LOG_LEVEL)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    /// Directory for the rotating log file
    #[arg(long = "log-dir", env = "LLM_PERF_LOG_DIR", default_value = "logs")]
    pub log_dir: String,

    /// Log to the console only
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,
}
