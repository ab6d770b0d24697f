use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::SinkError;

const CONCURRENT_SUFFIX: &str = "_concurrent";

/// Writes `content` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns an error when the parent directory or the file cannot be written.
pub async fn write_report(path: &Path, content: &str) -> Result<(), SinkError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| SinkError::CreateDir {
                path: parent.to_path_buf(),
                source: err,
            })?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|err| SinkError::WriteReport {
            path: path.to_path_buf(),
            source: err,
        })
}

/// `<stem>_concurrent<.ext>` beside `path`.
#[must_use]
pub fn concurrent_report_path(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_stem()
        .map_or_else(|| OsString::from("analysis"), OsString::from);
    file_name.push(CONCURRENT_SUFFIX);
    if let Some(ext) = path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    path.with_file_name(file_name)
}
