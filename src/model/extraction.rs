//! LLM-extractable model metadata and extraction outcomes

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Structured output shape requested from the LLM.
///
/// Every field is nullable so the LLM can answer "no model in this text" by
/// returning nulls. Use [`ExtractedModelPayload::into_data`] to get the
/// validated [`ExtractedModelData`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ExtractedModelPayload {
    /// Technical model identifier, lowercase with hyphens (e.g. "gpt-4", "claude-3-sonnet", "llama-2")
    pub model_name: Option<String>,
    /// Organization that created the model (e.g. "OpenAI", "Anthropic", "Meta")
    pub organization: Option<String>,
    /// Release date in ISO format (YYYY-MM-DD)
    pub release_date: Option<NaiveDate>,
    /// Brief description of model capabilities (1-2 sentences)
    pub description: Option<String>,
    /// License type (e.g. "Apache 2.0", "MIT", "Proprietary", "Other")
    pub license: Option<String>,
}

impl ExtractedModelPayload {
    /// Whether the LLM reported a model name at all
    pub fn has_model_name(&self) -> bool {
        non_blank(self.model_name.clone()).is_some()
    }

    /// Convert into extracted data.
    ///
    /// Returns `None` unless both `model_name` and `description` are present
    /// and non-blank. Blank optional fields are normalized to `None`.
    pub fn into_data(self) -> Option<ExtractedModelData> {
        let model_name = non_blank(self.model_name)?;
        let description = non_blank(self.description)?;

        Some(ExtractedModelData {
            model_name,
            organization: non_blank(self.organization),
            release_date: self.release_date,
            description,
            license: non_blank(self.license),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Model metadata extracted from unstructured text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedModelData {
    pub model_name: String,
    pub organization: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub description: String,
    pub license: Option<String>,
}

/// Result of one extraction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Extracted data, `None` when the text contained no model information
    pub data: Option<ExtractedModelData>,
    /// Input plus output tokens charged for the call
    pub tokens_used: u64,
    /// LLM model identifier that produced the result
    pub model_used: String,
}
