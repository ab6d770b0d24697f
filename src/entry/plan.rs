use chrono::Local;
use clap::ArgMatches;

use crate::args::{TesterArgs, run_stamp};
use crate::config::{Settings, apply_config, load_config};
use crate::error::{AppError, AppResult, ConfigError};

/// Merges the config file into `args` and resolves the run settings.
pub(super) fn build_settings(args: &mut TesterArgs, matches: &ArgMatches) -> AppResult<Settings> {
    let working_dir = std::env::current_dir()
        .map_err(|err| AppError::config(ConfigError::WorkingDirectory { source: err }))?;
    if let Some(config) = load_config(args.config.as_deref(), &working_dir)? {
        apply_config(args, matches, &config)?;
    }

    let stamp = run_stamp(Local::now());
    Settings::from_args(args, &stamp, &working_dir)
}
