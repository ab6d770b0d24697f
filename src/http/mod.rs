//! Chat-completion request construction, execution and batch runners.
mod client;
mod endpoint;
mod executor;
mod persist;
mod runner;
mod tls;

#[cfg(test)]
mod tests;

pub use client::build_client;
pub use endpoint::{
    API_KEY_HEADER, CLIENT_REQUEST_ID_HEADER, COMPLETIONS_PATH, CONVERSATION_ID_HEADER,
    EndpointConfig,
};
pub use executor::{RequestExecutor, RequestOptions};
pub use persist::{response_file_name, save_raw_response};
pub use runner::{BatchOutcome, ConcurrencyRunner, FailureRecord, SequentialRunner};
