use std::path::{Path, PathBuf};

use crate::error::DatasetError;

/// Regular files directly inside `dir` with extension `ext`, sorted by name.
pub(super) async fn files_with_extension(
    dir: &Path,
    ext: &str,
) -> Result<Vec<PathBuf>, DatasetError> {
    let read_dir_error = |err| DatasetError::ReadDir {
        path: dir.to_path_buf(),
        source: err,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|value| value.to_str())
            .is_some_and(|value| value.eq_ignore_ascii_case(ext));
        if matches_ext && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub(super) async fn read_file(path: &Path) -> Result<String, DatasetError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| DatasetError::ReadFile {
            path: path.to_path_buf(),
            source: err,
        })
}
