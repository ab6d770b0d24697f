use std::io;
use std::path::Path;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};

pub const LOG_FILE_NAME: &str = "llm-perf.log";
/// Size at which the log file is rotated.
pub const LOG_MAX_BYTES: u64 = 5_000_000;
/// Rotated files kept beside the active one (`llm-perf.log.1` and up).
pub const LOG_BACKUPS: usize = 3;

/// Opens `dir/file_name` for appending, creating `dir` first. The file rolls
/// over once it reaches `max_bytes`, keeping `backups` older files.
///
/// # Errors
///
/// Returns an error when the directory or the file cannot be created.
pub fn open_log_file(
    dir: &Path,
    file_name: &str,
    max_bytes: u64,
    backups: usize,
) -> io::Result<BasicRollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    BasicRollingFileAppender::new(
        dir.join(file_name),
        RollingConditionBasic::new().max_size(max_bytes),
        backups,
    )
}
