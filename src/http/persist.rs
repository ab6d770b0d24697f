use std::path::{Path, PathBuf};

use crate::error::SinkError;

/// File name for a raw response, safe to join onto the result directory.
#[must_use]
pub fn response_file_name(request_id: &str) -> String {
    let safe: String = request_id
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\') { '_' } else { ch })
        .collect();
    format!("response_{}.json", safe)
}

/// Writes the generated content of one response into `dir`.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or the file cannot
/// be written.
pub async fn save_raw_response(
    dir: &Path,
    request_id: &str,
    content: &str,
) -> Result<PathBuf, SinkError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|err| SinkError::CreateDir {
            path: dir.to_path_buf(),
            source: err,
        })?;
    let path = dir.join(response_file_name(request_id));
    tokio::fs::write(&path, content)
        .await
        .map_err(|err| SinkError::WriteResponse {
            path: path.clone(),
            source: err,
        })?;
    Ok(path)
}
