use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::TokenUsage;

#[derive(Debug, Default, Deserialize)]
pub(super) struct UsagePayload {
    #[serde(default)]
    total_tokens: Option<u64>,
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens_details: Option<CompletionTokensDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionTokensDetails {
    #[serde(default)]
    reasoning_tokens: Option<u64>,
}

impl From<UsagePayload> for TokenUsage {
    fn from(payload: UsagePayload) -> Self {
        Self {
            total_tokens: payload.total_tokens.unwrap_or(0),
            prompt_tokens: payload.prompt_tokens.unwrap_or(0),
            completion_tokens: payload.completion_tokens.unwrap_or(0),
            reasoning_tokens: payload
                .completion_tokens_details
                .and_then(|details| details.reasoning_tokens)
                .unwrap_or(0),
        }
    }
}

/// Buffered `chat/completions` response body.
#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletion {
    #[serde(default)]
    pub(super) id: Option<String>,
    #[serde(default)]
    pub(super) choices: Option<Vec<CompletionChoice>>,
    #[serde(default)]
    pub(super) usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompletionChoice {
    #[serde(default)]
    pub(super) message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompletionMessage {
    #[serde(default)]
    pub(super) content: Option<String>,
}

/// Reads usage counters from a streamed `usage` object. Counters that are
/// missing or not unsigned integers read as zero.
pub(super) fn usage_from_object(usage: &Map<String, Value>) -> TokenUsage {
    let count = |key: &str| usage.get(key).and_then(Value::as_u64).unwrap_or(0);
    TokenUsage {
        total_tokens: count("total_tokens"),
        prompt_tokens: count("prompt_tokens"),
        completion_tokens: count("completion_tokens"),
        reasoning_tokens: usage
            .get("completion_tokens_details")
            .and_then(|details| details.get("reasoning_tokens"))
            .and_then(Value::as_u64)
            .unwrap_or(0),
    }
}
