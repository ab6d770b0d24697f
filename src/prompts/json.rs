use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::DatasetError;

use super::PromptSource;
use super::files::{files_with_extension, read_file};

/// Reads `*.json` chat request bodies and takes `messages[0].content` from each.
#[derive(Debug, Clone)]
pub struct JsonPromptSource {
    dir: PathBuf,
}

impl JsonPromptSource {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

#[async_trait]
impl PromptSource for JsonPromptSource {
    async fn load(&self) -> Result<Vec<String>, DatasetError> {
        let files = files_with_extension(&self.dir, "json").await?;
        let mut prompts = Vec::with_capacity(files.len());
        for path in files {
            let content = read_file(&path).await?;
            let request: Value =
                serde_json::from_str(&content).map_err(|err| DatasetError::ParseJson {
                    path: path.clone(),
                    source: err,
                })?;
            let prompt = request
                .pointer("/messages/0/content")
                .and_then(Value::as_str)
                .ok_or_else(|| DatasetError::MissingPrompt { path: path.clone() })?;
            debug!("Loaded prompt from {}", path.display());
            prompts.push(prompt.to_owned());
        }
        Ok(prompts)
    }
}
