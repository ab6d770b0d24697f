use async_trait::async_trait;
use reqwest::Response;
use tokio::time::Instant;
use tracing::debug;

use crate::error::MetricsError;

use super::builder::{BuiltMetric, MetricsBuilder};
use super::types::{PerformanceMetric, TokenUsage, UNKNOWN_REQUEST_ID};
use super::wire::ChatCompletion;

/// Measures a non-streamed response.
///
/// There is no incremental signal in a buffered body, so time to first token
/// is reported as the total request time. The clock stops when the response
/// head arrives, before the body is decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferedMetricsBuilder;

#[async_trait]
impl MetricsBuilder for BufferedMetricsBuilder {
    async fn build(
        &self,
        start: Instant,
        response: Response,
        prompt: &str,
    ) -> Result<BuiltMetric, MetricsError> {
        let end = Instant::now();
        let body = response
            .bytes()
            .await
            .map_err(|err| MetricsError::ReadBody { source: err })?;
        let parsed = parse_completion(&body)?;

        let total_time = end.saturating_duration_since(start);
        let metric = PerformanceMetric::new(
            parsed.usage,
            total_time,
            total_time,
            parsed.request_id,
            prompt.to_owned(),
        );
        Ok((metric, parsed.content))
    }
}

#[derive(Debug)]
pub(crate) struct ParsedCompletion {
    pub(crate) usage: TokenUsage,
    pub(crate) request_id: String,
    pub(crate) content: String,
}

/// Extracts content, usage and id from a buffered completion body.
///
/// Missing usage counters read as zero; a missing `choices[0].message` is an
/// error.
pub(crate) fn parse_completion(body: &[u8]) -> Result<ParsedCompletion, MetricsError> {
    let completion: ChatCompletion =
        serde_json::from_slice(body).map_err(|err| MetricsError::InvalidJson { source: err })?;

    let message = completion
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or(MetricsError::MissingChoices)?;

    let usage = completion.usage.map(TokenUsage::from).unwrap_or_default();
    debug!("Usage received: {:?}", usage);

    Ok(ParsedCompletion {
        usage,
        request_id: completion
            .id
            .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_owned()),
        content: message.content.unwrap_or_default(),
    })
}
