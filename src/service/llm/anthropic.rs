//! Anthropic Messages API client
//!
//! Implements [`StructuredGenerator`] over `POST /v1/messages`, using the
//! structured-outputs beta when the request carries an output schema.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{GenerationRequest, GenerationResponse, LlmError, StructuredGenerator, TokenUsage};

const ANTHROPIC_API_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
const ENV_REQUEST_TIMEOUT: &str = "LLM_REQUEST_TIMEOUT_SECS";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const STRUCTURED_OUTPUTS_BETA: &str = "structured-outputs-2025-11-13";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: Vec<SystemBlock<'a>>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<OutputFormat<'a>>,
}

#[derive(Serialize)]
struct SystemBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Serialize)]
struct CacheControl {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OutputFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    schema: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: TokenUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Client for the Anthropic Messages API
///
/// Holds one pooled `reqwest::Client`; safe to share between concurrent calls.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    ///
    /// The base URL is resolved in this order:
    /// 1. `ANTHROPIC_BASE_URL` environment variable if set
    /// 2. Default Anthropic API URL
    ///
    /// The request timeout comes from `LLM_REQUEST_TIMEOUT_SECS` (default 120).
    pub fn new(api_key: &str) -> Result<Self, LlmError> {
        let base_url =
            env::var(ANTHROPIC_BASE_URL_ENV).unwrap_or_else(|_| ANTHROPIC_API_BASE_URL.to_string());
        let timeout_secs = env::var(ENV_REQUEST_TIMEOUT)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self::with_base_url(api_key, &base_url, Duration::from_secs(timeout_secs))
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "Anthropic API key not configured. Set ANTHROPIC_API_KEY".to_string(),
            ));
        }

        let parsed = Url::parse(base_url).map_err(|e| {
            LlmError::Configuration(format!("Invalid Anthropic base URL '{}': {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LlmError::Configuration(format!(
                "Invalid Anthropic base URL '{}': scheme must be http or https",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StructuredGenerator for AnthropicClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = build_request_body(request)?;
        let structured = request.output_schema.is_some();

        tracing::debug!(
            model = %request.model,
            structured = structured,
            cache_system_prompt = request.cache_system_prompt,
            user_message_length = request.user_message.len(),
            "Sending Anthropic messages request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        if structured {
            builder = builder.header("anthropic-beta", STRUCTURED_OUTPUTS_BETA);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transient(format!("Failed to read Anthropic response: {}", e)))?;

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), error_detail(&text)));
        }

        parse_response(&text, structured)
    }
}

/// Only connection-level failures are worth another attempt
fn classify_send_error(e: &reqwest::Error) -> LlmError {
    let message = format!("Request to Anthropic failed: {}", e);
    if e.is_builder() {
        LlmError::Configuration(message)
    } else if e.is_connect() || e.is_timeout() || e.is_request() {
        LlmError::Transient(message)
    } else {
        LlmError::Rejected(message)
    }
}

/// Build the JSON body for a messages request
fn build_request_body(request: &GenerationRequest) -> Result<serde_json::Value, LlmError> {
    let body = MessagesRequest {
        model: &request.model,
        max_tokens: request.max_output_tokens,
        system: vec![SystemBlock {
            kind: "text",
            text: &request.system_prompt,
            cache_control: request
                .cache_system_prompt
                .then_some(CacheControl { kind: "ephemeral" }),
        }],
        messages: vec![Message {
            role: "user",
            content: &request.user_message,
        }],
        output_format: request.output_schema.as_ref().map(|schema| OutputFormat {
            kind: "json_schema",
            schema,
        }),
    };

    serde_json::to_value(body)
        .map_err(|e| LlmError::Configuration(format!("Failed to encode messages request: {}", e)))
}

/// Parse a successful messages response body
fn parse_response(body: &str, structured: bool) -> Result<GenerationResponse, LlmError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::MalformedOutput(format!("Invalid response envelope: {}", e)))?;

    let text: String = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect();

    let payload = if structured {
        serde_json::from_str(&text).map_err(|e| {
            LlmError::MalformedOutput(format!(
                "Structured output is not valid JSON (stop_reason: {}): {}",
                response.stop_reason.as_deref().unwrap_or("unknown"),
                e
            ))
        })?
    } else {
        serde_json::Value::String(text)
    };

    Ok(GenerationResponse {
        model: response.model,
        payload,
        usage: response.usage,
    })
}

/// Extract a readable detail from an error body, falling back to the raw text
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{}: {}", envelope.error.kind, envelope.error.message),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::llm::{LlmClient, RetryPolicy};
    use serde_json::json;

    fn request(cache: bool, schema: Option<serde_json::Value>) -> GenerationRequest {
        GenerationRequest {
            model: "claude-sonnet-4-5".to_string(),
            system_prompt: "You are a data extraction assistant.".to_string(),
            user_message: "Extract model information from this text:\n\nGPT-4 ...".to_string(),
            output_schema: schema,
            cache_system_prompt: cache,
            max_output_tokens: 4096,
        }
    }

    #[test]
    fn test_body_marks_system_prompt_cacheable() {
        let body = build_request_body(&request(true, None)).unwrap();
        assert_eq!(body["system"][0]["cache_control"], json!({ "type": "ephemeral" }));
        assert_eq!(body["system"][0]["type"], "text");
        assert_eq!(body["max_tokens"], 4096);
        assert!(body.get("output_format").is_none());
    }

    #[test]
    fn test_cache_flag_only_toggles_annotation() {
        let schema = json!({ "type": "object" });
        let mut cached = build_request_body(&request(true, Some(schema.clone()))).unwrap();
        let uncached = build_request_body(&request(false, Some(schema))).unwrap();

        assert!(uncached["system"][0].get("cache_control").is_none());

        cached["system"][0]
            .as_object_mut()
            .unwrap()
            .remove("cache_control");
        assert_eq!(cached, uncached);
    }

    #[test]
    fn test_body_attaches_schema() {
        let schema = json!({ "type": "object", "properties": { "model_name": { "type": "string" } } });
        let body = build_request_body(&request(false, Some(schema.clone()))).unwrap();
        assert_eq!(body["output_format"]["type"], "json_schema");
        assert_eq!(body["output_format"]["schema"], schema);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_parse_structured_response() {
        let body = json!({
            "id": "msg_01",
            "type": "message",
            "model": "claude-sonnet-4-5-20250929",
            "content": [{ "type": "text", "text": "{\"model_name\":\"gpt-4\"}" }],
            "stop_reason": "end_turn",
            "usage": {
                "input_tokens": 500,
                "output_tokens": 150,
                "cache_creation_input_tokens": 0,
                "cache_read_input_tokens": 420
            }
        })
        .to_string();

        let response = parse_response(&body, true).unwrap();
        assert_eq!(response.model, "claude-sonnet-4-5-20250929");
        assert_eq!(response.payload["model_name"], "gpt-4");
        assert_eq!(response.usage.total(), 650);
        assert_eq!(response.usage.cache_read_input_tokens, Some(420));
    }

    #[test]
    fn test_parse_response_without_cache_counters() {
        let body = json!({
            "model": "claude-sonnet-4-5",
            "content": [{ "type": "text", "text": "plain answer" }],
            "usage": { "input_tokens": 12, "output_tokens": 3 }
        })
        .to_string();

        let response = parse_response(&body, false).unwrap();
        assert_eq!(response.payload, json!("plain answer"));
        assert!(response.usage.cache_creation_input_tokens.is_none());
    }

    #[test]
    fn test_parse_truncated_structured_output() {
        let body = json!({
            "model": "claude-sonnet-4-5",
            "content": [{ "type": "text", "text": "{\"model_name\":\"gp" }],
            "stop_reason": "max_tokens",
            "usage": { "input_tokens": 12, "output_tokens": 4096 }
        })
        .to_string();

        match parse_response(&body, true) {
            Err(LlmError::MalformedOutput(msg)) => assert!(msg.contains("max_tokens")),
            other => panic!("expected malformed output, got {:?}", other.map(|r| r.payload)),
        }
    }

    #[test]
    fn test_error_detail_from_envelope() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(error_detail(body), "overloaded_error: Overloaded");
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_detail(""), "empty response body");
    }

    #[test]
    fn test_empty_api_key_is_configuration_error() {
        let result = AnthropicClient::with_base_url("  ", ANTHROPIC_API_BASE_URL, Duration::from_secs(5));
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transient() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = AnthropicClient::with_base_url(
            "test-key",
            "http://127.0.0.1:9",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = client.generate(&request(false, None)).await;
        assert!(matches!(result, Err(LlmError::Transient(_))));
    }

    #[test]
    fn test_base_url_without_scheme_is_configuration_error() {
        for base_url in ["api.anthropic.com", "localhost:8080", "not a url"] {
            let result = AnthropicClient::with_base_url("test-key", base_url, Duration::from_secs(5));
            assert!(
                matches!(result, Err(LlmError::Configuration(_))),
                "{} should be rejected",
                base_url
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_header_is_not_retried() {
        // A newline in the key makes the x-api-key header unbuildable
        let client = AnthropicClient::with_base_url(
            "test\nkey",
            "http://127.0.0.1:9",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = client.generate(&request(false, None)).await;
        match result {
            Err(e @ LlmError::Configuration(_)) => assert!(!e.is_transient()),
            other => panic!("expected configuration error, got {:?}", other.map(|r| r.model)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_header_fails_without_backoff() {
        let client = AnthropicClient::with_base_url(
            "test\nkey",
            "http://127.0.0.1:9",
            Duration::from_secs(2),
        )
        .unwrap();
        let llm = LlmClient::with_generator(std::sync::Arc::new(client));
        let started = tokio::time::Instant::now();

        let result = llm
            .invoke(&request(false, None), &RetryPolicy::default())
            .await;

        assert!(matches!(result, Err(LlmError::Configuration(_))));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    #[ignore] // Requires network access and ANTHROPIC_API_KEY
    async fn test_real_messages_call() {
        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap();
        let client = AnthropicClient::new(&api_key).unwrap();
        let result = client.generate(&request(true, None)).await;
        assert!(result.is_ok());
    }
}
