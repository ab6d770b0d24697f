use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration_value;

/// Optional config file contents. Keys mirror the long CLI flags in snake_case.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_version: Option<String>,
    pub verify_ssl: Option<bool>,
    pub streaming: Option<bool>,
    pub concurrent: Option<usize>,
    pub request_delay: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub temperature: Option<f64>,
    pub use_common_prompt: Option<bool>,
    pub dataset_dir: Option<String>,
    pub output_markdown: Option<String>,
    pub result_dir: Option<String>,
}

/// A duration written either as seconds (`1.5`) or as text such as `"500ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(f64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, String> {
        match self {
            DurationValue::Seconds(secs) => Duration::try_from_secs_f64(*secs)
                .map_err(|err| format!("{} seconds is out of range: {}", secs, err)),
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
