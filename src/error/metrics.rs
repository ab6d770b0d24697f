use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to read response body: {source}")]
    ReadBody {
        #[source]
        source: reqwest::Error,
    },
    #[error("Stream interrupted: {source}")]
    StreamRead {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to parse response body: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed event stream: {reason}")]
    MalformedStream { reason: String },
    #[error("Malformed stream event: {reason}")]
    MalformedEvent { reason: &'static str },
    #[error("Response has no choices[0].message.")]
    MissingChoices,
    #[error("Cannot summarize an empty batch of results.")]
    EmptyBatch,
}

impl MetricsError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            MetricsError::ReadBody { source } | MetricsError::StreamRead { source } => {
                source.is_timeout()
            }
            MetricsError::InvalidJson { .. }
            | MetricsError::MalformedStream { .. }
            | MetricsError::MalformedEvent { .. }
            | MetricsError::MissingChoices
            | MetricsError::EmptyBatch => false,
        }
    }
}
