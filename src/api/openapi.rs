//! OpenAPI document and specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::{benchmark_results, benchmarks, error, extraction, health, models, opinions, use_cases};
use crate::model;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Model Catalogue API",
        description = "Catalogue of AI models, benchmarks, opinions and use cases, with LLM-assisted extraction"
    ),
    paths(
        health::root,
        health::liveness,
        health::readiness,
        models::list_models,
        models::search_models,
        models::get_model_by_name,
        models::get_model,
        models::create_model,
        models::update_model,
        models::delete_model,
        models::model_benchmarks,
        models::model_opinions,
        models::model_use_cases,
        benchmarks::list_benchmarks,
        benchmarks::list_categories,
        benchmarks::get_benchmark,
        benchmarks::create_benchmark,
        benchmarks::update_benchmark,
        benchmarks::delete_benchmark,
        benchmark_results::list_results,
        benchmark_results::get_result,
        benchmark_results::create_result,
        benchmark_results::update_result,
        benchmark_results::delete_result,
        opinions::list_opinions,
        opinions::search_opinions,
        opinions::get_opinion,
        opinions::create_opinion,
        opinions::update_opinion,
        opinions::delete_opinion,
        use_cases::list_use_cases,
        use_cases::get_use_case,
        use_cases::create_use_case,
        use_cases::update_use_case,
        use_cases::delete_use_case,
        extraction::extract,
    ),
    components(schemas(
        error::ErrorResponse,
        health::HealthStatus,
        health::ReadinessStatus,
        health::DependencyHealth,
        health::ServiceInfo,
        model::ModelRecord,
        model::ModelCreate,
        model::ModelUpdate,
        model::Benchmark,
        model::BenchmarkCreate,
        model::BenchmarkUpdate,
        model::BenchmarkResult,
        model::BenchmarkResultCreate,
        model::BenchmarkResultUpdate,
        model::Opinion,
        model::OpinionCreate,
        model::OpinionUpdate,
        model::UseCase,
        model::UseCaseCreate,
        model::UseCaseUpdate,
        model::ExtractedModelData,
        extraction::ExtractRequest,
        extraction::ExtractResponse,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "models", description = "AI model catalogue"),
        (name = "benchmarks", description = "Benchmark definitions"),
        (name = "benchmark-results", description = "Model scores on benchmarks"),
        (name = "opinions", description = "Public opinions about models"),
        (name = "use-cases", description = "Use cases mentioned for models"),
        (name = "extraction", description = "LLM-assisted model extraction from text")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_extraction_and_crud_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/v1/extract",
            "/api/v1/models",
            "/api/v1/models/{id}",
            "/api/v1/models/search",
            "/api/v1/benchmarks/categories",
            "/api/v1/benchmark-results/{id}",
            "/api/v1/opinions/search",
            "/api/v1/use-cases",
            "/health/ready",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_yaml_renders() {
        let yaml = ApiDoc::openapi().to_yaml().unwrap();
        assert!(yaml.contains("Model Catalogue API"));
    }
}
