use std::pin::pin;

use async_trait::async_trait;
use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::{Stream, StreamExt, future, stream};
use reqwest::Response;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::MetricsError;

use super::builder::{BuiltMetric, MetricsBuilder};
use super::types::{PerformanceMetric, TokenUsage, UNKNOWN_REQUEST_ID};
use super::wire::usage_from_object;

const DONE_MARKER: &str = "[DONE]";
/// Longest line handed to the event parser; the rest of a longer line is dropped.
pub(crate) const MAX_LINE_BYTES: usize = 1 << 20;
/// Appended to every body so a final event without a blank line is still dispatched.
const STREAM_FLUSH: &[u8] = b"\n\n";

/// Measures a server-sent-event response as its events arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingMetricsBuilder;

#[async_trait]
impl MetricsBuilder for StreamingMetricsBuilder {
    async fn build(
        &self,
        start: Instant,
        response: Response,
        prompt: &str,
    ) -> Result<BuiltMetric, MetricsError> {
        read_event_stream(response.bytes_stream(), start, prompt, MAX_LINE_BYTES).await
    }
}

/// Decodes `body` as server-sent events and accumulates them until `[DONE]`
/// or the end of the body.
///
/// # Errors
///
/// Returns an error when the transport fails mid-stream, the bytes are not a
/// valid UTF-8 event stream, or an event has the wrong top-level shape.
pub(crate) async fn read_event_stream<S>(
    body: S,
    start: Instant,
    prompt: &str,
    max_line_bytes: usize,
) -> Result<BuiltMetric, MetricsError>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send,
{
    let mut guard = LineGuard::new(max_line_bytes);
    let flush = stream::once(future::ready(Ok(Bytes::from_static(STREAM_FLUSH))));
    let events = body
        .chain(flush)
        .map(move |chunk| chunk.map(|bytes| guard.admit(bytes)))
        .eventsource();
    let mut events = pin!(events);

    let mut accumulator = StreamAccumulator::new();
    while let Some(event) = events.next().await {
        let event = event.map_err(stream_error)?;
        if accumulator.feed_event(&event.data, Instant::now())? == EventOutcome::Done {
            break;
        }
    }
    Ok(accumulator.finish(start, Instant::now(), prompt))
}

fn stream_error(err: EventStreamError<reqwest::Error>) -> MetricsError {
    match err {
        EventStreamError::Transport(source) => MetricsError::StreamRead { source },
        EventStreamError::Utf8(source) => MetricsError::MalformedStream {
            reason: source.to_string(),
        },
        EventStreamError::Parser(source) => MetricsError::MalformedStream {
            reason: source.to_string(),
        },
    }
}

/// Truncates lines longer than the limit before they reach the event parser.
///
/// Each byte is looked at once. A truncated `data:` line no longer parses as
/// JSON and is skipped like any other unreadable payload. Truncation waits for
/// the end of a multi-byte character so the stream stays valid UTF-8.
#[derive(Debug)]
pub(crate) struct LineGuard {
    limit: usize,
    line_len: usize,
    truncating: bool,
}

impl LineGuard {
    pub(crate) const fn new(limit: usize) -> Self {
        Self {
            limit,
            line_len: 0,
            truncating: false,
        }
    }

    pub(crate) fn admit(&mut self, chunk: Bytes) -> Bytes {
        let mut kept: Option<Vec<u8>> = None;
        for (offset, byte) in chunk.iter().copied().enumerate() {
            if self.keep(byte) {
                if let Some(buffer) = kept.as_mut() {
                    buffer.push(byte);
                }
            } else if kept.is_none() {
                kept = Some(chunk.get(..offset).unwrap_or_default().to_vec());
            }
        }
        kept.map_or(chunk, Bytes::from)
    }

    fn keep(&mut self, byte: u8) -> bool {
        if byte == b'\n' || byte == b'\r' {
            self.line_len = 0;
            self.truncating = false;
            return true;
        }
        if self.truncating {
            return false;
        }
        let continuation = (byte & 0xC0) == 0x80;
        if self.line_len >= self.limit && !continuation {
            warn!(
                "Stream line exceeds {} bytes; dropping the remainder",
                self.limit
            );
            self.truncating = true;
            return false;
        }
        self.line_len = self.line_len.saturating_add(1);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventOutcome {
    Continue,
    Done,
}

/// Streaming parse state: first-event time, collected content and the
/// latest usage counters.
#[derive(Debug)]
pub(crate) struct StreamAccumulator {
    first_event_at: Option<Instant>,
    content: String,
    usage: TokenUsage,
    request_id: String,
}

impl StreamAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            first_event_at: None,
            content: String::new(),
            usage: TokenUsage::default(),
            request_id: UNKNOWN_REQUEST_ID.to_owned(),
        }
    }

    /// Handles the data of one event received at `at`.
    ///
    /// Each data line is a payload of its own, so servers that separate
    /// events with a single newline are read line by line.
    ///
    /// # Errors
    ///
    /// Returns an error when a payload is JSON but not an object, or when its
    /// `choices` is neither an array nor null.
    pub(crate) fn feed_event(&mut self, data: &str, at: Instant) -> Result<EventOutcome, MetricsError> {
        for payload in data.split('\n') {
            if self.feed_payload(payload.trim(), at)? == EventOutcome::Done {
                return Ok(EventOutcome::Done);
            }
        }
        Ok(EventOutcome::Continue)
    }

    fn feed_payload(&mut self, payload: &str, at: Instant) -> Result<EventOutcome, MetricsError> {
        if payload.is_empty() {
            return Ok(EventOutcome::Continue);
        }
        if payload == DONE_MARKER {
            return Ok(EventOutcome::Done);
        }

        let event: Value = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(err) => {
                debug!("Skipping malformed stream event: {}", err);
                return Ok(EventOutcome::Continue);
            }
        };
        if self.first_event_at.is_none() {
            self.first_event_at = Some(at);
        }

        let fields = event.as_object().ok_or(MetricsError::MalformedEvent {
            reason: "event is not a JSON object",
        })?;

        if let Some(choices) = fields.get("choices").filter(|choices| !choices.is_null()) {
            let choices = choices.as_array().ok_or(MetricsError::MalformedEvent {
                reason: "`choices` is not an array",
            })?;
            let fragment = choices
                .first()
                .and_then(|choice| choice.get("delta"))
                .and_then(|delta| delta.get("content"))
                .and_then(Value::as_str);
            if let Some(fragment) = fragment {
                self.content.push_str(fragment);
            }
        }

        if let Some(usage) = fields
            .get("usage")
            .and_then(Value::as_object)
            .filter(|usage| !usage.is_empty())
        {
            self.usage = usage_from_object(usage);
            debug!("Usage received: {:?}", self.usage);
        }

        if let Some(id) = fields.get("id").and_then(Value::as_str) {
            id.clone_into(&mut self.request_id);
        }
        Ok(EventOutcome::Continue)
    }

    /// Closes the stream at `end`.
    pub(crate) fn finish(self, start: Instant, end: Instant, prompt: &str) -> BuiltMetric {
        let total_time = end.saturating_duration_since(start);
        let time_to_first_token = self
            .first_event_at
            .map_or(total_time, |at| at.saturating_duration_since(start));
        let metric = PerformanceMetric::new(
            self.usage,
            total_time,
            time_to_first_token,
            self.request_id,
            prompt.to_owned(),
        );
        (metric, self.content)
    }
}
