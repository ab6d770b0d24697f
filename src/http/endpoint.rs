use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use uuid::Uuid;

use crate::error::HttpError;
use crate::metrics::ResponseMode;

pub const COMPLETIONS_PATH: &str = "/chat/completions";
/// Key header understood by Azure-style deployments.
pub const API_KEY_HEADER: &str = "api-key";
pub const CONVERSATION_ID_HEADER: &str = "x-conversation-id";
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

const API_VERSION_PARAM: &str = "api-version";

/// Where and as whom requests are sent. Shared read-only by every request of
/// a run.
#[derive(Clone)]
pub struct EndpointConfig {
    base_url: String,
    api_key: String,
    model: String,
    api_version: Option<String>,
    verify_ssl: bool,
}

impl EndpointConfig {
    #[must_use]
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        api_version: Option<String>,
        verify_ssl: bool,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            model,
            api_version: api_version.filter(|version| !version.trim().is_empty()),
            verify_ssl,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    #[must_use]
    pub const fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    /// `{base_url}/chat/completions`, plus `?api-version=V` when a version is
    /// configured and the URL does not carry one already.
    #[must_use]
    pub fn completions_url(&self) -> String {
        let url = format!("{}{}", self.base_url, COMPLETIONS_PATH);
        match self.api_version.as_deref() {
            Some(version) if !url.contains(API_VERSION_PARAM) => {
                format!("{}?{}={}", url, API_VERSION_PARAM, version)
            }
            Some(_) | None => url,
        }
    }

    /// Fresh header map for one request, with new trace ids.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is not a valid header value.
    pub fn request_headers(&self) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.api_key.is_empty() {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(
                |err| HttpError::InvalidHeader {
                    name: "authorization",
                    source: err,
                },
            )?;
            headers.insert(AUTHORIZATION, bearer);
            let key =
                HeaderValue::from_str(&self.api_key).map_err(|err| HttpError::InvalidHeader {
                    name: API_KEY_HEADER,
                    source: err,
                })?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        }

        headers.insert(
            HeaderName::from_static(CONVERSATION_ID_HEADER),
            trace_id_value(),
        );
        headers.insert(
            HeaderName::from_static(CLIENT_REQUEST_ID_HEADER),
            trace_id_value(),
        );
        Ok(headers)
    }

    pub(crate) fn request_body<'req>(
        &'req self,
        prompt: &'req str,
        temperature: f64,
        mode: ResponseMode,
    ) -> ChatRequest<'req> {
        ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            stream: mode.is_streaming(),
            stream_options: mode
                .is_streaming()
                .then_some(StreamOptions { include_usage: true }),
        }
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

fn trace_id_value() -> HeaderValue {
    let mut buffer = Uuid::encode_buffer();
    let id = Uuid::new_v4().hyphenated().encode_lower(&mut buffer);
    HeaderValue::from_str(id).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'req> {
    model: &'req str,
    messages: [ChatMessage<'req>; 1],
    temperature: f64,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'req> {
    role: &'static str,
    content: &'req str,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}
