use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("llm-perf/", env!("CARGO_PKG_VERSION"));

/// Config files picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["llm-perf.toml", "llm-perf.json"];

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp used to name the default report and result directory of one run.
#[must_use]
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format(STAMP_FORMAT).to_string()
}

#[must_use]
pub fn default_markdown_path(stamp: &str) -> PathBuf {
    Path::new("analysis").join(format!("analysis_{}.md", stamp))
}

#[must_use]
pub fn default_result_dir(base: &Path, stamp: &str) -> PathBuf {
    base.join(format!("analysis_{}", stamp))
}
