//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;

#[cfg(test)]
mod test_support;

pub use cli::TesterArgs;
pub use defaults::{DEFAULT_CONFIG_FILES, default_markdown_path, default_result_dir, run_stamp};

pub(crate) use defaults::DEFAULT_USER_AGENT;
pub(crate) use parsers::{parse_bool_env, parse_duration_value, parse_temperature};
