//! Prompt sources: where the benchmark gets its prompts from.
mod csv;
mod files;
mod json;


use std::path::Path;

use async_trait::async_trait;

use crate::config::PromptSourceKind;
use crate::error::DatasetError;

pub use csv::CsvPromptSource;
pub use json::JsonPromptSource;

#[cfg(feature = "fuzzing")]
pub(crate) use csv::parse_records;

/// Supplies the ordered prompt list for a run.
#[async_trait]
pub trait PromptSource: Send + Sync {
    /// Loads every prompt, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns an error when the dataset directory or one of its files
    /// cannot be read or parsed.
    async fn load(&self) -> Result<Vec<String>, DatasetError>;
}

/// The prompt source selected by `kind` over `dir`.
#[must_use]
pub fn source_for(kind: PromptSourceKind, dir: &Path) -> Box<dyn PromptSource> {
    match kind {
        PromptSourceKind::Csv => Box::new(CsvPromptSource::new(dir)),
        PromptSourceKind::Json => Box::new(JsonPromptSource::new(dir)),
    }
}
