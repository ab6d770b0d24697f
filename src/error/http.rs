use thiserror::Error;

use super::MetricsError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid value for header '{name}': {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("Request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to extract metrics: {source}")]
    ExtractMetrics {
        #[source]
        source: MetricsError,
    },
}

impl HttpError {
    /// Returns true when the transport layer gave up because the request timeout elapsed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            HttpError::Transport { source } => source.is_timeout(),
            HttpError::ExtractMetrics { source } => source.is_timeout(),
            HttpError::BuildClientFailed { .. }
            | HttpError::InvalidHeader { .. }
            | HttpError::Status { .. } => false,
        }
    }
}
