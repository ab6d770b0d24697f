use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Response;
use tokio::time::Instant;

use crate::error::MetricsError;

use super::buffered::BufferedMetricsBuilder;
use super::streaming::StreamingMetricsBuilder;
use super::types::PerformanceMetric;

/// A metric plus the generated text it was measured from.
pub type BuiltMetric = (PerformanceMetric, String);

/// How the server is asked to deliver the completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Buffered,
    Streaming,
}

impl ResponseMode {
    #[must_use]
    pub const fn from_streaming(streaming: bool) -> Self {
        if streaming {
            ResponseMode::Streaming
        } else {
            ResponseMode::Buffered
        }
    }

    #[must_use]
    pub const fn is_streaming(self) -> bool {
        matches!(self, ResponseMode::Streaming)
    }
}

/// Turns a successful HTTP response into a [`PerformanceMetric`].
///
/// `start` is the instant taken right before the request was sent; all
/// timings are measured from it.
#[async_trait]
pub trait MetricsBuilder: Send + Sync {
    /// Consumes the response body and measures it.
    ///
    /// # Errors
    ///
    /// Returns an error when the body cannot be read or has no usable
    /// structure. No partial metric is produced in that case.
    async fn build(
        &self,
        start: Instant,
        response: Response,
        prompt: &str,
    ) -> Result<BuiltMetric, MetricsError>;
}

/// The builder pair a request executor selects from per request.
#[derive(Clone)]
pub struct MetricsBuilders {
    buffered: Arc<dyn MetricsBuilder>,
    streaming: Arc<dyn MetricsBuilder>,
}

impl MetricsBuilders {
    #[must_use]
    pub fn new(buffered: Arc<dyn MetricsBuilder>, streaming: Arc<dyn MetricsBuilder>) -> Self {
        Self {
            buffered,
            streaming,
        }
    }

    #[must_use]
    pub fn for_mode(&self, mode: ResponseMode) -> &dyn MetricsBuilder {
        match mode {
            ResponseMode::Buffered => self.buffered.as_ref(),
            ResponseMode::Streaming => self.streaming.as_ref(),
        }
    }
}

impl Default for MetricsBuilders {
    fn default() -> Self {
        Self::new(
            Arc::new(BufferedMetricsBuilder),
            Arc::new(StreamingMetricsBuilder),
        )
    }
}

impl std::fmt::Debug for MetricsBuilders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsBuilders").finish_non_exhaustive()
    }
}
