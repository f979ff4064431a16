//! Error types for LLM provider calls

use thiserror::Error;

/// Failure of a structured-generation call.
///
/// Provider-specific errors are classified into these variants at the
/// transport boundary; nothing provider-specific escapes it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LlmError {
    /// Rate limiting, provider 5xx or connection-level failure; safe to retry
    #[error("Transient LLM provider failure: {0}")]
    Transient(String),

    /// Malformed request, authentication or validation rejection; never retried
    #[error("LLM provider rejected the request: {0}")]
    Rejected(String),

    /// The response could not be parsed into the requested output shape
    #[error("LLM output does not match the requested schema: {0}")]
    MalformedOutput(String),

    /// Every attempt failed transiently
    #[error("LLM call failed after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<LlmError> },

    /// Missing or invalid client configuration
    #[error("LLM configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Classify a non-success HTTP status returned by the provider
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let message = format!("HTTP {}: {}", status, detail.into());
        if is_transient_status(status) {
            LlmError::Transient(message)
        } else {
            LlmError::Rejected(message)
        }
    }

    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transient(_))
    }
}

/// 429 and the whole 5xx range (including the provider's 529 "overloaded")
fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_transient() {
        assert!(LlmError::from_status(429, "rate_limit_error").is_transient());
    }

    #[test]
    fn test_server_errors_are_transient() {
        for status in [500, 502, 503, 529] {
            assert!(
                LlmError::from_status(status, "api_error").is_transient(),
                "status {} should be transient",
                status
            );
        }
    }

    #[test]
    fn test_client_errors_are_rejected() {
        for status in [400, 401, 403, 404, 413, 422] {
            let err = LlmError::from_status(status, "invalid_request_error");
            assert!(matches!(err, LlmError::Rejected(_)), "status {}", status);
        }
    }

    #[test]
    fn test_exhausted_message_keeps_last_failure() {
        let err = LlmError::ExhaustedRetries {
            attempts: 4,
            last: Box::new(LlmError::from_status(503, "overloaded")),
        };
        let message = err.to_string();
        assert!(message.contains("4 attempts"));
        assert!(message.contains("HTTP 503: overloaded"));
        assert!(!err.is_transient());
    }
}
