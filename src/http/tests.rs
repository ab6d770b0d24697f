use std::future::Future;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use super::*;
use crate::error::{HttpError, MetricsError};
use crate::metrics::ResponseMode;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);
const BUFFERED_BODY: &str = r#"{"id":"chatcmpl-mock","choices":[{"message":{"content":"hello there"}}],"usage":{"total_tokens":30,"prompt_tokens":10,"completion_tokens":20}}"#;
const STREAM_BODY: &str = concat!(
    "data: {\"id\":\"chatcmpl-stream\",\"choices\":[{\"delta\":{\"content\":\"hel\"}}]}\n\n",
    "data: {\"id\":\"chatcmpl-stream\",\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
    "data: {\"id\":\"chatcmpl-stream\",\"choices\":[],\"usage\":{\"total_tokens\":12,\"prompt_tokens\":4,\"completion_tokens\":8,\"completion_tokens_details\":{\"reasoning_tokens\":3}}}\n\n",
    "data: [DONE]\n\n",
);

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn endpoint(addr: SocketAddr, api_key: &str) -> EndpointConfig {
    EndpointConfig::new(
        &format!("http://{}/v1/", addr),
        api_key.to_owned(),
        "mock-model".to_owned(),
        None,
        true,
    )
}

fn buffered_options() -> RequestOptions {
    RequestOptions {
        temperature: 0.0,
        mode: ResponseMode::Buffered,
    }
}

fn prompts(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Minimal chat-completions server. Prompts containing `fail` get a 500,
/// prompts containing `slow` are never answered, streaming requests get SSE.
/// A streaming prompt containing `cut` gets half of its body before the
/// connection closes.
async fn spawn_mock_server() -> Result<(SocketAddr, JoinHandle<()>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind mock server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read mock server addr: {}", err))?;

    let task = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                drop(handle_connection(stream).await);
            });
        }
    });
    Ok((addr, task))
}

async fn handle_connection(mut stream: TcpStream) -> Result<(), String> {
    let body = read_request_body(&mut stream).await?;
    if body.contains("slow") {
        tokio::time::sleep(TEST_TIMEOUT).await;
        return Ok(());
    }
    let response = if body.contains("fail") {
        http_response("500 Internal Server Error", "application/json", "{\"error\":\"boom\"}")
    } else if body.contains("cut") && body.contains("\"stream\":true") {
        cut_response(STREAM_BODY)
    } else if body.contains("\"stream\":true") {
        http_response("200 OK", "text/event-stream", STREAM_BODY)
    } else {
        http_response("200 OK", "application/json", BUFFERED_BODY)
    };
    stream
        .write_all(response.as_bytes())
        .await
        .map_err(|err| format!("Mock write failed: {}", err))
}

async fn read_request_body(stream: &mut TcpStream) -> Result<String, String> {
    let mut request = Vec::with_capacity(2048);
    let mut expected_len = None;
    loop {
        let mut chunk = [0_u8; 1024];
        let read = tokio::time::timeout(TEST_TIMEOUT, stream.read(&mut chunk))
            .await
            .map_err(|_err| "Mock read timed out".to_owned())?
            .map_err(|err| format!("Mock read failed: {}", err))?;
        if read == 0 {
            break;
        }
        let prefix = chunk
            .get(..read)
            .ok_or_else(|| "Mock read past buffer".to_owned())?;
        request.extend_from_slice(prefix);

        let text = String::from_utf8_lossy(&request);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let body_start = head_end.saturating_add(4);
            let content_length = *expected_len.get_or_insert_with(|| content_length(&text));
            if request.len() >= body_start.saturating_add(content_length) {
                return Ok(text.get(body_start..).unwrap_or_default().to_owned());
            }
        }
    }
    Ok(String::new())
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    )
}

/// Announces the full body length but sends only its first half.
fn cut_response(body: &str) -> String {
    let half = body.get(..body.len() / 2).unwrap_or_default();
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        half
    )
}

/// Tracks how many requests are open at once. Each request is held for
/// `hold` before the buffered body is returned.
async fn spawn_counting_server(
    hold: Duration,
    peak: Arc<AtomicUsize>,
) -> Result<(SocketAddr, JoinHandle<()>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind counting server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read counting server addr: {}", err))?;
    let in_flight = Arc::new(AtomicUsize::new(0));

    let task = tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                if read_request_body(&mut stream).await.is_err() {
                    return;
                }
                let open = in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
                peak.fetch_max(open, Ordering::SeqCst);
                tokio::time::sleep(hold).await;
                // Released before the reply so the client cannot start its
                // next request while this one still counts.
                in_flight.fetch_sub(1, Ordering::SeqCst);
                let response = http_response("200 OK", "application/json", BUFFERED_BODY);
                drop(stream.write_all(response.as_bytes()).await);
            });
        }
    });
    Ok((addr, task))
}

#[test]
fn completions_url_appends_api_version_once() -> Result<(), String> {
    let plain = EndpointConfig::new(
        "https://llm.example/v1/",
        String::new(),
        "m".to_owned(),
        None,
        true,
    );
    if plain.completions_url() != "https://llm.example/v1/chat/completions" {
        return Err(format!("Unexpected url: {}", plain.completions_url()));
    }

    let versioned = EndpointConfig::new(
        "https://llm.example/openai",
        String::new(),
        "m".to_owned(),
        Some("2024-06-01".to_owned()),
        true,
    );
    if versioned.completions_url()
        != "https://llm.example/openai/chat/completions?api-version=2024-06-01"
    {
        return Err(format!("Unexpected url: {}", versioned.completions_url()));
    }

    let blank_version = EndpointConfig::new(
        "https://llm.example",
        String::new(),
        "m".to_owned(),
        Some("  ".to_owned()),
        true,
    );
    if blank_version.api_version().is_some() {
        return Err("Blank api version should be ignored".to_owned());
    }
    Ok(())
}

#[test]
fn headers_carry_auth_and_fresh_trace_ids() -> Result<(), String> {
    let config = EndpointConfig::new(
        "https://llm.example",
        "secret".to_owned(),
        "m".to_owned(),
        None,
        true,
    );
    let first = config.request_headers().map_err(|err| err.to_string())?;
    let second = config.request_headers().map_err(|err| err.to_string())?;

    let auth = first
        .get(reqwest::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if auth != Some("Bearer secret") {
        return Err(format!("Unexpected authorization header: {:?}", auth));
    }
    let key = first
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if key != Some("secret") {
        return Err(format!("Unexpected api-key header: {:?}", key));
    }
    for name in [CONVERSATION_ID_HEADER, CLIENT_REQUEST_ID_HEADER] {
        let (Some(a), Some(b)) = (first.get(name), second.get(name)) else {
            return Err(format!("Missing trace header {}", name));
        };
        if a == b {
            return Err(format!("Trace header {} reused across requests", name));
        }
    }
    if format!("{:?}", config).contains("secret") {
        return Err("Debug output leaks the api key".to_owned());
    }
    Ok(())
}

#[test]
fn headers_skip_auth_without_key() -> Result<(), String> {
    let config = EndpointConfig::new("http://local", String::new(), "m".to_owned(), None, true);
    let headers = config.request_headers().map_err(|err| err.to_string())?;
    if headers.contains_key(reqwest::header::AUTHORIZATION) || headers.contains_key(API_KEY_HEADER)
    {
        return Err("Auth headers sent without an api key".to_owned());
    }
    Ok(())
}

#[test]
fn request_body_requests_usage_only_when_streaming() -> Result<(), String> {
    let config = EndpointConfig::new("http://local", String::new(), "gpt".to_owned(), None, true);

    let streaming = serde_json::to_value(config.request_body("hi", 0.5, ResponseMode::Streaming))
        .map_err(|err| err.to_string())?;
    let expected = serde_json::json!({
        "model": "gpt",
        "messages": [{"role": "user", "content": "hi"}],
        "temperature": 0.5,
        "stream": true,
        "stream_options": {"include_usage": true}
    });
    if streaming != expected {
        return Err(format!("Unexpected streaming body: {}", streaming));
    }

    let buffered = serde_json::to_value(config.request_body("hi", 0.5, ResponseMode::Buffered))
        .map_err(|err| err.to_string())?;
    let stream_flag = buffered.get("stream").and_then(serde_json::Value::as_bool);
    if buffered.get("stream_options").is_some() || stream_flag != Some(false) {
        return Err(format!("Unexpected buffered body: {}", buffered));
    }
    Ok(())
}

#[test]
fn response_file_name_flattens_path_separators() -> Result<(), String> {
    let name = response_file_name("run/1\\a");
    if name != "response_run_1_a.json" {
        return Err(format!("Unexpected file name: {}", name));
    }
    Ok(())
}

#[test]
fn buffered_request_measures_and_saves_content() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let executor = RequestExecutor::new(endpoint(addr, "key"), Some(dir.path().to_path_buf()));
        let client =
            build_client(executor.endpoint(), TEST_TIMEOUT, None).map_err(|err| err.to_string())?;

        let metric = executor
            .single_request(&client, "hello", 0.0, ResponseMode::Buffered)
            .await
            .map_err(|err| err.to_string())?;
        server.abort();

        if metric.total_tokens() != 30 || metric.completion_tokens() != 20 {
            return Err(format!("Unexpected token counts: {:?}", metric));
        }
        if metric.request_id() != "chatcmpl-mock" || metric.prompt() != "hello" {
            return Err(format!("Unexpected identity: {:?}", metric));
        }
        if metric.time_to_first_token() > metric.total_time() {
            return Err("Time to first token exceeds total time".to_owned());
        }
        let saved = std::fs::read_to_string(dir.path().join("response_chatcmpl-mock.json"))
            .map_err(|err| format!("Raw response not saved: {}", err))?;
        if saved != "hello there" {
            return Err(format!("Unexpected saved content: {}", saved));
        }
        Ok(())
    })
}

#[test]
fn streaming_request_collects_usage_and_content() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let executor = RequestExecutor::new(endpoint(addr, ""), Some(dir.path().to_path_buf()));
        let client =
            build_client(executor.endpoint(), TEST_TIMEOUT, None).map_err(|err| err.to_string())?;

        let metric = executor
            .single_request(&client, "stream me", 0.0, ResponseMode::Streaming)
            .await
            .map_err(|err| err.to_string())?;
        server.abort();

        if metric.total_tokens() != 12 || metric.reasoning_tokens() != 3 {
            return Err(format!("Unexpected usage: {:?}", metric));
        }
        if metric.request_id() != "chatcmpl-stream" {
            return Err(format!("Unexpected request id: {}", metric.request_id()));
        }
        let saved = std::fs::read_to_string(dir.path().join("response_chatcmpl-stream.json"))
            .map_err(|err| format!("Raw response not saved: {}", err))?;
        if saved != "hello" {
            return Err(format!("Unexpected saved content: {}", saved));
        }
        Ok(())
    })
}

#[test]
fn error_status_carries_code_and_body() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let executor = RequestExecutor::new(endpoint(addr, ""), None);
        let client =
            build_client(executor.endpoint(), TEST_TIMEOUT, None).map_err(|err| err.to_string())?;

        let result = executor
            .single_request(&client, "please fail", 0.0, ResponseMode::Buffered)
            .await;
        server.abort();

        match result {
            Err(HttpError::Status { status: 500, body }) if body.contains("boom") => Ok(()),
            other => Err(format!("Expected HTTP 500 failure, got {:?}", other)),
        }
    })
}

#[test]
fn concurrency_runner_partitions_partial_failures() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let runner = ConcurrencyRunner::new(RequestExecutor::new(endpoint(addr, ""), None));
        let limit = NonZeroUsize::new(2).ok_or("zero limit")?;
        let batch = prompts(&["one", "fail two", "three", "fail four", "five"]);

        let outcome = runner
            .run(&batch, limit, TEST_TIMEOUT, buffered_options())
            .await
            .map_err(|err| err.to_string())?;
        server.abort();

        if outcome.metrics.len() != 3 || outcome.failure_count() != 2 {
            return Err(format!(
                "Expected 3 successes and 2 failures, got {} and {}",
                outcome.metrics.len(),
                outcome.failure_count()
            ));
        }
        let order: Vec<&str> = outcome.metrics.iter().map(|m| m.prompt()).collect();
        if order != ["one", "three", "five"] {
            return Err(format!("Successes not in submission order: {:?}", order));
        }
        let failed: Vec<Option<usize>> = outcome.failures.iter().map(|f| f.index).collect();
        if failed != [Some(1), Some(3)] {
            return Err(format!("Unexpected failure indexes: {:?}", failed));
        }
        Ok(())
    })
}

#[test]
fn concurrency_runner_never_exceeds_limit() -> Result<(), String> {
    run_async_test(async {
        let peak = Arc::new(AtomicUsize::new(0));
        let (addr, server) =
            spawn_counting_server(Duration::from_millis(50), Arc::clone(&peak)).await?;
        let runner = ConcurrencyRunner::new(RequestExecutor::new(endpoint(addr, ""), None));
        let limit = NonZeroUsize::new(2).ok_or("zero limit")?;
        let batch = prompts(&["a", "b", "c", "d", "e", "f"]);

        let outcome = runner
            .run(&batch, limit, TEST_TIMEOUT, buffered_options())
            .await
            .map_err(|err| err.to_string())?;
        server.abort();

        if outcome.metrics.len() != 6 {
            return Err(format!("Expected 6 successes, got {:?}", outcome.failures));
        }
        let observed = peak.load(Ordering::SeqCst);
        if observed == 0 || observed > 2 {
            return Err(format!("Expected at most 2 requests in flight, saw {}", observed));
        }
        Ok(())
    })
}

#[test]
fn stream_cut_mid_body_fails_with_read_error() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let executor = RequestExecutor::new(endpoint(addr, ""), None);
        let client =
            build_client(executor.endpoint(), TEST_TIMEOUT, None).map_err(|err| err.to_string())?;

        let result = executor
            .single_request(&client, "cut short", 0.0, ResponseMode::Streaming)
            .await;
        server.abort();

        match result {
            Err(HttpError::ExtractMetrics {
                source: MetricsError::StreamRead { .. },
            }) => Ok(()),
            other => Err(format!("Expected a stream read failure, got {:?}", other)),
        }
    })
}

#[test]
fn timeout_fails_only_the_slow_request() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let runner = ConcurrencyRunner::new(RequestExecutor::new(endpoint(addr, ""), None));
        let limit = NonZeroUsize::new(4).ok_or("zero limit")?;
        let batch = prompts(&["fast", "slow one"]);

        let outcome = runner
            .run(&batch, limit, Duration::from_millis(300), buffered_options())
            .await
            .map_err(|err| err.to_string())?;
        server.abort();

        if outcome.metrics.len() != 1 || outcome.timeout_count() != 1 {
            return Err(format!(
                "Expected one success and one timeout, got {:?}",
                outcome.failures
            ));
        }
        Ok(())
    })
}

#[test]
fn sequential_runner_continues_after_failure() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let runner = SequentialRunner::new(
            RequestExecutor::new(endpoint(addr, ""), None),
            Duration::from_millis(1),
        );
        let batch = prompts(&["first", "fail second", "third"]);

        let outcome = runner
            .run(&batch, TEST_TIMEOUT, buffered_options())
            .await
            .map_err(|err| err.to_string())?;
        server.abort();

        if outcome.metrics.len() != 2 || outcome.failure_count() != 1 {
            return Err(format!("Unexpected outcome: {:?}", outcome));
        }
        Ok(())
    })
}

/// Ignores the body and reports a fixed token count.
struct FixedMetricsBuilder;

#[async_trait::async_trait]
impl crate::metrics::MetricsBuilder for FixedMetricsBuilder {
    async fn build(
        &self,
        start: tokio::time::Instant,
        _response: reqwest::Response,
        prompt: &str,
    ) -> Result<crate::metrics::BuiltMetric, crate::error::MetricsError> {
        let usage = crate::metrics::TokenUsage {
            total_tokens: 7,
            ..crate::metrics::TokenUsage::default()
        };
        let elapsed = start.elapsed();
        let metric = crate::metrics::PerformanceMetric::new(
            usage,
            elapsed,
            elapsed,
            "fixed".to_owned(),
            prompt.to_owned(),
        );
        Ok((metric, String::new()))
    }
}

#[test]
fn executor_uses_injected_builder_for_mode() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server().await?;
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let fixed: std::sync::Arc<dyn crate::metrics::MetricsBuilder> =
            std::sync::Arc::new(FixedMetricsBuilder);
        let builders = crate::metrics::MetricsBuilders::new(
            fixed,
            std::sync::Arc::new(crate::metrics::StreamingMetricsBuilder),
        );
        let executor = RequestExecutor::new(endpoint(addr, ""), Some(dir.path().to_path_buf()))
            .with_builders(builders);
        let client =
            build_client(executor.endpoint(), TEST_TIMEOUT, None).map_err(|err| err.to_string())?;

        let metric = executor
            .single_request(&client, "hello", 0.0, ResponseMode::Buffered)
            .await
            .map_err(|err| err.to_string())?;
        server.abort();

        if metric.request_id() != "fixed" || metric.total_tokens() != 7 {
            return Err(format!("Injected builder not used: {:?}", metric));
        }
        let saved = std::fs::read_dir(dir.path())
            .map_err(|err| err.to_string())?
            .count();
        if saved != 0 {
            return Err("Empty content should not be saved".to_owned());
        }
        Ok(())
    })
}
