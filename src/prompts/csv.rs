use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::DatasetError;

use super::PromptSource;
use super::files::{files_with_extension, read_file};

const PROMPT_COLUMN: usize = 2;

/// Reads one column of every `*.csv` file in a directory.
#[derive(Debug, Clone)]
pub struct CsvPromptSource {
    dir: PathBuf,
    column: usize,
    has_header: bool,
}

impl CsvPromptSource {
    /// Third column, header row skipped.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            column: PROMPT_COLUMN,
            has_header: true,
        }
    }

    #[must_use]
    pub const fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    #[must_use]
    pub const fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    fn prompts_from(&self, content: &str) -> Vec<String> {
        let skip = usize::from(self.has_header);
        parse_records(content)
            .into_iter()
            .skip(skip)
            .filter_map(|record| {
                let value = record.get(self.column)?.trim();
                (!value.is_empty()).then(|| value.to_owned())
            })
            .collect()
    }
}

#[async_trait]
impl PromptSource for CsvPromptSource {
    async fn load(&self) -> Result<Vec<String>, DatasetError> {
        let files = files_with_extension(&self.dir, "csv").await?;
        let mut prompts = Vec::new();
        for path in files {
            let content = read_file(&path).await?;
            let found = self.prompts_from(&content);
            debug!("Loaded {} prompts from {}", found.len(), path.display());
            prompts.extend(found);
        }
        Ok(prompts)
    }
}

/// Splits CSV text into records of fields.
///
/// Quoted fields may contain commas, line breaks and doubled quotes. Blank
/// lines produce no record. A leading byte-order mark is ignored.
#[must_use]
pub(crate) fn parse_records(content: &str) -> Vec<Vec<String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => {
                in_quotes = true;
                field_started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                field_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if field_started || !field.is_empty() || !record.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
            }
            _ => {
                field.push(ch);
                field_started = true;
            }
        }
    }

    if field_started || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
