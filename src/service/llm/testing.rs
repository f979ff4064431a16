//! Scripted generator for tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationRequest, GenerationResponse, LlmError, StructuredGenerator, TokenUsage};

/// Replays scripted results in order and records every request it receives.
/// Once the script runs out it keeps answering with a transient failure.
pub struct ScriptedGenerator {
    results: Mutex<Vec<Result<GenerationResponse, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(mut results: Vec<Result<GenerationResponse, LlmError>>) -> Self {
        results.reverse();
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A generator answering once with the given payload and token counts
    pub fn answering(payload: serde_json::Value, input_tokens: u64, output_tokens: u64) -> Self {
        Self::new(vec![Ok(response(payload, input_tokens, output_tokens))])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Build a provider response with the given payload and usage
pub fn response(payload: serde_json::Value, input_tokens: u64, output_tokens: u64) -> GenerationResponse {
    GenerationResponse {
        model: "claude-sonnet-4-5-20250929".to_string(),
        payload,
        usage: TokenUsage {
            input_tokens,
            output_tokens,
            cache_creation_input_tokens: Some(0),
            cache_read_input_tokens: Some(input_tokens / 2),
        },
    }
}

#[async_trait]
impl StructuredGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(LlmError::Transient("HTTP 529: overloaded_error".to_string())))
    }
}
