//! Error types for model extraction

use thiserror::Error;

use crate::service::llm::LlmError;

/// Error type for model extraction
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    /// Empty or whitespace-only input; detected before any LLM call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The LLM answered but found no model in the text
    #[error(
        "No model information could be extracted from the provided text. Please ensure the text contains information about an AI model."
    )]
    NoDataFound,

    /// The LLM call itself failed (after retries where applicable)
    #[error("LLM extraction failed: {0}")]
    Upstream(#[from] LlmError),
}
