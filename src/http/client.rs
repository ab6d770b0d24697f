use std::num::NonZeroUsize;
use std::time::Duration;

use reqwest::Client;
use tracing::error;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;

use super::endpoint::EndpointConfig;
use super::tls::apply_tls_settings;

/// Builds the shared HTTP client used for a batch of requests.
///
/// `request_timeout` bounds each request from connect to the last body byte.
/// `pool_max_idle` caps the idle keep-alive connections kept per host.
///
/// # Errors
///
/// Returns an error when the TLS backend or client cannot be initialized.
pub fn build_client(
    endpoint: &EndpointConfig,
    request_timeout: Duration,
    pool_max_idle: Option<NonZeroUsize>,
) -> Result<Client, HttpError> {
    let mut client_builder = Client::builder()
        .timeout(request_timeout)
        .user_agent(DEFAULT_USER_AGENT);

    if let Some(max_idle) = pool_max_idle {
        client_builder = client_builder.pool_max_idle_per_host(max_idle.get());
    }

    client_builder = apply_tls_settings(client_builder, endpoint.verify_ssl());

    client_builder.build().map_err(|err| {
        error!("Failed to build HTTP client: {}", err);
        HttpError::BuildClientFailed { source: err }
    })
}
