//! Application state and service initialization
//!
//! This module centralizes service initialization and dependency injection.

use actix_cors::Cors;
use actix_web::web;
use sqlx::PgPool;

use crate::model::{Config, CorsConfig, ExtractionSettings};
use crate::service::catalogue::CatalogueService;
use crate::service::extraction::ModelExtractionService;
use crate::service::llm::LlmClient;

/// Environment variable holding the Anthropic API key
const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Application state shared with every worker
pub struct AppState {
    /// Database connection pool (readiness probe)
    pub db_pool: web::Data<PgPool>,
    /// Catalogue reads and writes
    pub catalogue: web::Data<CatalogueService>,
    /// LLM extraction; `None` when no API key is configured
    pub extractor: web::Data<Option<ModelExtractionService>>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Database connection and schema initialization
    /// 2. LLM client initialization (optional, requires ANTHROPIC_API_KEY)
    /// 3. Service construction
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let extractor = match Self::build_extractor(&config.extraction) {
            Ok(service) => Some(service),
            Err(e) => {
                tracing::warn!(error = %e, "LLM extraction disabled");
                None
            }
        };

        let catalogue = CatalogueService::new(db_pool.clone());

        Ok(Self {
            db_pool: web::Data::new(db_pool),
            catalogue: web::Data::new(catalogue),
            extractor: web::Data::new(extractor),
        })
    }

    /// Build the extraction service from ANTHROPIC_API_KEY
    fn build_extractor(settings: &ExtractionSettings) -> Result<ModelExtractionService, AppError> {
        let api_key = std::env::var(ENV_ANTHROPIC_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AppError::MissingConfig(ENV_ANTHROPIC_API_KEY))?;

        let llm_client =
            LlmClient::new(&api_key).map_err(|e| AppError::InvalidConfig(e.to_string()))?;

        ModelExtractionService::new(llm_client, settings)
            .map_err(|e| AppError::InvalidConfig(e.to_string()))
    }
}

/// CORS policy for the configured browser origins
pub fn cors(config: &CorsConfig) -> Cors {
    config
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::header, test};

    #[actix_web::test]
    async fn test_cors_allows_configured_origin_only() {
        let config = CorsConfig::default();
        let app = test::init_service(
            App::new()
                .wrap(cors(&config))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:5173"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://evil.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
