//! Shared LLM client and structured-generation transport
//!
//! A single provider call is abstracted behind [`StructuredGenerator`]; the
//! [`LlmClient`] wraps it with the bounded retry policy from [`retry`].

mod anthropic;
pub mod error;
pub mod retry;
#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub use anthropic::AnthropicClient;
pub use error::LlmError;
pub use retry::RetryPolicy;

/// Default output token cap for a single generation
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// One structured-generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_message: String,
    /// JSON schema the response must conform to; `None` for free text
    pub output_schema: Option<serde_json::Value>,
    /// Ask the provider to cache the system prompt. Never changes what is asked.
    pub cache_system_prompt: bool,
    pub max_output_tokens: u32,
}

/// Token counters reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}

impl TokenUsage {
    /// Input plus output tokens
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Provider response to a [`GenerationRequest`]
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Model identifier reported by the provider
    pub model: String,
    /// Parsed JSON payload for schema-constrained requests, a JSON string otherwise
    pub payload: serde_json::Value,
    pub usage: TokenUsage,
}

impl GenerationResponse {
    /// Deserialize the payload into the requested output type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, LlmError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| LlmError::MalformedOutput(e.to_string()))
    }
}

/// A single call to a structured-generation provider, without retries
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    generator: Arc<dyn StructuredGenerator>,
}

impl LlmClient {
    /// Create a new Anthropic-backed client with the provided API key
    pub fn new(api_key: &str) -> Result<Self, LlmError> {
        let client = AnthropicClient::new(api_key)?;
        Ok(Self::with_generator(Arc::new(client)))
    }

    /// Create a client over any generator implementation
    pub fn with_generator(generator: Arc<dyn StructuredGenerator>) -> Self {
        Self { generator }
    }

    /// Perform one request, retrying transient failures according to `policy`
    pub async fn invoke(
        &self,
        request: &GenerationRequest,
        policy: &RetryPolicy,
    ) -> Result<GenerationResponse, LlmError> {
        retry::with_retry(policy, || self.generator.generate(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_total() {
        let usage = TokenUsage {
            input_tokens: 500,
            output_tokens: 150,
            ..Default::default()
        };
        assert_eq!(usage.total(), 650);
    }

    #[test]
    fn test_parse_payload_malformed() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Expected {
            name: String,
        }

        let response = GenerationResponse {
            model: "claude-sonnet-4-5".to_string(),
            payload: json!({ "name": 12 }),
            usage: TokenUsage::default(),
        };

        let result = response.parse_payload::<Expected>();
        assert!(matches!(result, Err(LlmError::MalformedOutput(_))));
    }
}
