//! Model metadata extraction service using an LLM
//!
//! Turns free-form text into [`ExtractionOutcome`] via one schema-constrained
//! generation call.

use std::time::Duration;

use crate::model::{ExtractedModelPayload, ExtractionOutcome, ExtractionSettings};
use crate::service::extraction::prompts::{EXTRACTION_SYSTEM_PROMPT, build_extraction_prompt};
use crate::service::llm::{GenerationRequest, LlmClient, LlmError, RetryPolicy};

pub mod converters;
pub mod error;
pub mod prompts;
pub mod validation;

pub use converters::to_create_request;
pub use error::ExtractionError;
pub use validation::validate_extracted;

/// Environment variable for the extraction model (defaults to claude-sonnet-4-5 if not set)
const ENV_EXTRACTION_MODEL: &str = "EXTRACTION_MODEL";

/// Default model for extraction (Sonnet-class for reliable structured output)
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// JSON schema of the structured output requested from the LLM
fn extraction_schema() -> Result<serde_json::Value, LlmError> {
    let mut schema = serde_json::to_value(schemars::schema_for!(ExtractedModelPayload))
        .map_err(|e| LlmError::Configuration(format!("Failed to encode output schema: {}", e)))?;
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
    }
    Ok(schema)
}

/// Service for extracting model metadata from unstructured text
pub struct ModelExtractionService {
    llm_client: LlmClient,
    model: String,
    retry_policy: RetryPolicy,
    max_output_tokens: u32,
    use_cache: bool,
    output_schema: serde_json::Value,
}

impl ModelExtractionService {
    /// Create a new extraction service
    /// Uses a shared LLM client passed from startup.
    /// Optionally uses EXTRACTION_MODEL env var (defaults to claude-sonnet-4-5).
    pub fn new(
        llm_client: LlmClient,
        settings: &ExtractionSettings,
    ) -> Result<Self, ExtractionError> {
        let model =
            std::env::var(ENV_EXTRACTION_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::with_model(llm_client, model, settings)
    }

    /// Create an extraction service for an explicit model
    pub fn with_model(
        llm_client: LlmClient,
        model: impl Into<String>,
        settings: &ExtractionSettings,
    ) -> Result<Self, ExtractionError> {
        let model = model.into();
        let output_schema = extraction_schema()?;
        let retry_policy = RetryPolicy::new(
            settings.max_retries,
            Duration::from_millis(settings.initial_delay_ms),
        );

        tracing::info!(
            model = %model,
            max_retries = retry_policy.max_retries,
            "Model extraction service initialized"
        );

        Ok(Self {
            llm_client,
            model,
            retry_policy,
            max_output_tokens: settings.max_output_tokens,
            use_cache: settings.use_cache,
            output_schema,
        })
    }

    /// Whether callers should request prompt caching by default
    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    /// Extract AI model information from unstructured text.
    ///
    /// Fails with [`ExtractionError::InvalidInput`] before any LLM call when the
    /// text is empty or whitespace. A response that names no model yields an
    /// outcome with `data: None`, which is not an error at this level.
    pub async fn extract_model_data(
        &self,
        text: &str,
        use_cache: bool,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::InvalidInput(
                "Input text for extraction cannot be empty".to_string(),
            ));
        }

        let request = GenerationRequest {
            model: self.model.clone(),
            system_prompt: EXTRACTION_SYSTEM_PROMPT.to_string(),
            user_message: build_extraction_prompt(text),
            output_schema: Some(self.output_schema.clone()),
            cache_system_prompt: use_cache,
            max_output_tokens: self.max_output_tokens,
        };

        tracing::debug!(
            model = %self.model,
            text_length = text.len(),
            use_cache = use_cache,
            "Initiating LLM call for model extraction"
        );

        let start_time = std::time::Instant::now();

        let response = match self.llm_client.invoke(&request, &self.retry_policy).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "Failed to extract model data"
                );
                return Err(e.into());
            }
        };

        let payload = match response.parse_payload::<Option<ExtractedModelPayload>>() {
            Ok(payload) => payload.unwrap_or_default(),
            Err(e) => {
                tracing::error!(
                    model = %self.model,
                    error = %e,
                    "LLM returned output that does not match the extraction schema"
                );
                return Err(e.into());
            }
        };

        let had_model_name = payload.has_model_name();
        let data = payload.into_data();
        if had_model_name && data.is_none() {
            tracing::warn!(
                model = %self.model,
                "Extraction named a model but gave no description, treating as no data"
            );
        }

        let usage = response.usage;
        let tokens_used = usage.total();
        let model_used = if response.model.is_empty() {
            self.model.clone()
        } else {
            response.model
        };

        if use_cache {
            tracing::info!(
                model = %model_used,
                tokens_used = tokens_used,
                cache_read_tokens = usage.cache_read_input_tokens.unwrap_or(0),
                cache_creation_tokens = usage.cache_creation_input_tokens.unwrap_or(0),
                elapsed_ms = start_time.elapsed().as_millis(),
                "Extraction complete"
            );
        } else {
            tracing::info!(
                model = %model_used,
                tokens_used = tokens_used,
                elapsed_ms = start_time.elapsed().as_millis(),
                "Extraction complete"
            );
        }

        Ok(ExtractionOutcome {
            data,
            tokens_used,
            model_used,
        })
    }
}
