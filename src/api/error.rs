//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbError;
use crate::service::catalogue::CatalogueError;
use crate::service::extraction::ExtractionError;

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Unique name or key already taken (409)
    #[error("{0}")]
    Conflict(String),

    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The LLM found nothing to extract (400)
    #[error("{0}")]
    NoDataFound(String),

    /// The LLM provider failed or rejected the call (502)
    #[error("{0}")]
    ExtractionFailed(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "duplicate",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NoDataFound(_) => "no_data_found",
            ApiError::ExtractionFailed(_) => "extraction_failed",
            ApiError::Internal(_) => "internal_error",
            ApiError::Database(_) => "database_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) | ApiError::NoDataFound(_) => StatusCode::BAD_REQUEST,
            ApiError::ExtractionFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = self.error_type();
        let request_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                error_type = error_type,
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "API error"
            );
        } else {
            tracing::warn!(
                error_type = error_type,
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "API error"
            );
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id,
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<CatalogueError> for ApiError {
    fn from(err: CatalogueError) -> Self {
        match err {
            CatalogueError::NotFound(msg) => ApiError::NotFound(msg),
            CatalogueError::Conflict(msg) => ApiError::Conflict(msg),
            CatalogueError::Database(e) => e.into(),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            ExtractionError::NoDataFound => ApiError::NoDataFound(err.to_string()),
            ExtractionError::Upstream(_) => ApiError::ExtractionFailed(err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => ApiError::NotFound(id),
            DbError::UniqueViolation(msg) => ApiError::Conflict(msg),
            _ => ApiError::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::llm::LlmError;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), 404),
            (ApiError::Conflict("x".into()), 409),
            (ApiError::BadRequest("x".into()), 400),
            (ApiError::NoDataFound("x".into()), 400),
            (ApiError::ExtractionFailed("x".into()), 502),
            (ApiError::Internal("x".into()), 500),
            (ApiError::Database("x".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_extraction_error_mapping() {
        let invalid: ApiError = ExtractionError::InvalidInput("empty".into()).into();
        assert!(matches!(invalid, ApiError::BadRequest(_)));

        let none: ApiError = ExtractionError::NoDataFound.into();
        assert!(matches!(none, ApiError::NoDataFound(_)));

        let upstream: ApiError = ExtractionError::Upstream(LlmError::Rejected(
            "HTTP 400: invalid_request_error: bad schema".into(),
        ))
        .into();
        match upstream {
            ApiError::ExtractionFailed(msg) => assert!(msg.contains("bad schema")),
            other => panic!("expected extraction failure, got {:?}", other),
        }
    }

    #[test]
    fn test_catalogue_error_mapping() {
        let conflict: ApiError = CatalogueError::Conflict("Model 'gpt-4' already exists".into()).into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let missing: ApiError = CatalogueError::NotFound("Model with ID 9 not found".into()).into();
        assert_eq!(missing.to_string(), "Model with ID 9 not found");

        let unique: ApiError =
            CatalogueError::Database(DbError::UniqueViolation("models_name_key".into())).into();
        assert!(matches!(unique, ApiError::Conflict(_)));
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let response = ApiError::Conflict("Model 'gpt-4' already exists".into()).error_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "duplicate");
        assert_eq!(json["message"], "Model 'gpt-4' already exists");
        assert!(Uuid::parse_str(json["request_id"].as_str().unwrap()).is_ok());
    }
}
