//! Process entry: argument parsing, logging and the benchmark run.
mod execute;
mod plan;

use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{debug, warn};

use crate::args::TesterArgs;
use crate::error::AppResult;
use crate::logger::LogOptions;

/// Runs the benchmark as configured by `.env`, the environment, the command
/// line and the optional config file.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, an unreadable
/// prompt directory, or a runtime/client that cannot be built. Individual
/// request failures are logged and never end the run.
pub fn run() -> AppResult<()> {
    let dotenv = dotenvy::dotenv();
    let (mut args, matches) = parse_args()?;

    let _log_guard = crate::logger::init_logging(&LogOptions {
        verbose: args.verbose,
        no_color: args.no_color,
        log_dir: (!args.no_log_file).then(|| PathBuf::from(&args.log_dir)),
    });
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("Failed to load .env: {}", err),
    }

    let settings = plan::build_settings(&mut args, &matches)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(execute::run_tests(&settings))
}

fn parse_args() -> AppResult<(TesterArgs, ArgMatches)> {
    let matches = TesterArgs::command().get_matches();
    let args = TesterArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}
