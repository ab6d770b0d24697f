//! Console and rotating-file logging.
mod file;


use std::path::PathBuf;

use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub use file::{LOG_BACKUPS, LOG_FILE_NAME, LOG_MAX_BYTES, open_log_file};

/// Where and how to log.
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub verbose: bool,
    pub no_color: bool,
    /// Directory for the rotating log file; `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
}

/// Keeps the file writer flushing until the process exits.
#[derive(Debug)]
#[must_use = "dropping the guard stops the file log"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Picks the filter directive: `LLM_PERF_LOG`, then `RUST_LOG`, then the
/// `LOG_LEVEL` name, else `debug` when `verbose` and `info` otherwise.
pub(crate) fn filter_directive<F>(verbose: bool, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = ["LLM_PERF_LOG", "RUST_LOG"]
        .into_iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()));
    if let Some(directive) = explicit {
        return directive;
    }
    if let Some(level) = lookup("LOG_LEVEL").and_then(|value| level_name(&value)) {
        return level.to_owned();
    }
    let fallback = if verbose { "debug" } else { "info" };
    fallback.to_owned()
}

/// Maps logging level names, including `WARNING` and `CRITICAL`, onto
/// `tracing` levels.
fn level_name(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" | "fatal" => Some("error"),
        _ => None,
    }
}

/// Installs the global `tracing` subscriber: a console layer and, when
/// `log_dir` is set, a size-rotated file under it.
///
/// A log file that cannot be opened is reported and the run continues with
/// console output only.
pub fn init_logging(options: &LogOptions) -> LogGuard {
    let directive = filter_directive(options.verbose, |name| std::env::var(name).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_err| EnvFilter::new("info"));

    let file = options
        .log_dir
        .as_deref()
        .map(|dir| open_log_file(dir, LOG_FILE_NAME, LOG_MAX_BYTES, LOG_BACKUPS));
    let (file_layer, file_guard, file_error) = match file {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard), None)
        }
        Some(Err(err)) => (None, None, Some(err)),
        None => (None, None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(!options.no_color))
        .with(file_layer)
        .try_init();
    if let Err(err) = installed {
        eprintln!("Failed to set global default subscriber: {}", err);
    }

    match (file_error, options.log_dir.as_deref()) {
        (Some(err), Some(dir)) => warn!("File logging disabled, cannot open {}: {}", dir.display(), err),
        (None, Some(dir)) => debug!("Logging to {}", dir.join(LOG_FILE_NAME).display()),
        (Some(_) | None, None) => {}
    }

    LogGuard { _file: file_guard }
}
