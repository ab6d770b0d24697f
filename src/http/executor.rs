use std::path::PathBuf;
use std::sync::Arc;

use reqwest::{Client, Response};
use tokio::time::Instant;
use tracing::{error, info};

use crate::error::HttpError;
use crate::metrics::{MetricsBuilders, PerformanceMetric, ResponseMode};

use super::endpoint::EndpointConfig;
use super::persist::save_raw_response;

/// Per-request knobs shared by every request of a batch.
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    pub temperature: f64,
    pub mode: ResponseMode,
}

/// Sends one chat-completion request and measures it.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    endpoint: Arc<EndpointConfig>,
    builders: MetricsBuilders,
    result_dir: Option<PathBuf>,
}

impl RequestExecutor {
    #[must_use]
    pub fn new(endpoint: EndpointConfig, result_dir: Option<PathBuf>) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            builders: MetricsBuilders::default(),
            result_dir,
        }
    }

    #[must_use]
    pub fn with_builders(mut self, builders: MetricsBuilders) -> Self {
        self.builders = builders;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Issues `prompt` through `client` and returns its metric.
    ///
    /// Non-empty content is saved to the result directory; a failed save is
    /// logged and does not fail the request.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the request cannot be sent or times
    /// out, a status error carrying the code and body for non-2xx responses,
    /// and an extraction error when the body cannot be measured.
    pub async fn single_request(
        &self,
        client: &Client,
        prompt: &str,
        temperature: f64,
        mode: ResponseMode,
    ) -> Result<PerformanceMetric, HttpError> {
        let result = self.execute(client, prompt, temperature, mode).await;
        if let Err(err) = &result {
            error!("Request failed: {}", err);
        }
        result
    }

    async fn execute(
        &self,
        client: &Client,
        prompt: &str,
        temperature: f64,
        mode: ResponseMode,
    ) -> Result<PerformanceMetric, HttpError> {
        let headers = self.endpoint.request_headers()?;
        let body = self.endpoint.request_body(prompt, temperature, mode);
        let request = client
            .post(self.endpoint.completions_url())
            .headers(headers)
            .json(&body);

        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|err| HttpError::Transport { source: err })?;
        let response = ensure_success(response).await?;

        let (metric, content) = self
            .builders
            .for_mode(mode)
            .build(start, response, prompt)
            .await
            .map_err(|err| HttpError::ExtractMetrics { source: err })?;

        if !content.is_empty() {
            self.persist(metric.request_id(), &content).await;
        }
        Ok(metric)
    }

    async fn persist(&self, request_id: &str, content: &str) {
        let Some(dir) = self.result_dir.as_deref() else {
            return;
        };
        match save_raw_response(dir, request_id, content).await {
            Ok(path) => info!("Raw response saved to {}", path.display()),
            Err(err) => error!("{}", err),
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(text) => text,
        Err(err) => format!("<failed to read error body: {}>", err),
    };
    Err(HttpError::Status {
        status: status.as_u16(),
        body,
    })
}
