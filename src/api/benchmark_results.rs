//! REST API endpoints for benchmark results

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::validation;
use crate::db::repository::BenchmarkResultFilter;
use crate::model::{BenchmarkResult, BenchmarkResultCreate, BenchmarkResultUpdate};
use crate::service::catalogue::CatalogueService;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListResultsParams {
    /// Only results for this model
    pub model_id: Option<i64>,
    /// Only results on this benchmark; without model_id, ranked by score
    pub benchmark_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// List benchmark results, optionally filtered by model and/or benchmark
#[utoipa::path(
    get,
    path = "/api/v1/benchmark-results",
    params(ListResultsParams),
    responses(
        (status = 200, description = "Benchmark results", body = Vec<BenchmarkResult>),
        (status = 400, description = "Invalid pagination", body = ErrorResponse)
    ),
    tag = "benchmark-results"
)]
#[get("/api/v1/benchmark-results")]
pub async fn list_results(
    service: web::Data<CatalogueService>,
    query: web::Query<ListResultsParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(query.skip, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
    let filter = BenchmarkResultFilter {
        model_id: query.model_id,
        benchmark_id: query.benchmark_id,
    };
    Ok(HttpResponse::Ok().json(service.list_benchmark_results(filter, page).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/benchmark-results/{id}",
    params(("id" = i64, Path, description = "Benchmark result ID")),
    responses(
        (status = 200, description = "Benchmark result found", body = BenchmarkResult),
        (status = 404, description = "Benchmark result not found", body = ErrorResponse)
    ),
    tag = "benchmark-results"
)]
#[get("/api/v1/benchmark-results/{id}")]
pub async fn get_result(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.get_benchmark_result(path.into_inner()).await?))
}

/// Record a model's score on a benchmark
#[utoipa::path(
    post,
    path = "/api/v1/benchmark-results",
    request_body = BenchmarkResultCreate,
    responses(
        (status = 201, description = "Benchmark result created", body = BenchmarkResult),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Model or benchmark not found", body = ErrorResponse),
        (status = 409, description = "Result already recorded for this date", body = ErrorResponse)
    ),
    tag = "benchmark-results"
)]
#[post("/api/v1/benchmark-results")]
pub async fn create_result(
    service: web::Data<CatalogueService>,
    body: web::Json<BenchmarkResultCreate>,
) -> Result<HttpResponse, ApiError> {
    let create = body.into_inner();
    validation::benchmark_result_create(&create)?;
    Ok(HttpResponse::Created().json(service.create_benchmark_result(create).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/benchmark-results/{id}",
    params(("id" = i64, Path, description = "Benchmark result ID")),
    request_body = BenchmarkResultUpdate,
    responses(
        (status = 200, description = "Benchmark result updated", body = BenchmarkResult),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Benchmark result not found", body = ErrorResponse),
        (status = 409, description = "Result already recorded for this date", body = ErrorResponse)
    ),
    tag = "benchmark-results"
)]
#[patch("/api/v1/benchmark-results/{id}")]
pub async fn update_result(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    body: web::Json<BenchmarkResultUpdate>,
) -> Result<HttpResponse, ApiError> {
    let update = body.into_inner();
    validation::benchmark_result_update(&update)?;
    Ok(HttpResponse::Ok().json(
        service
            .update_benchmark_result(path.into_inner(), update)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/benchmark-results/{id}",
    params(("id" = i64, Path, description = "Benchmark result ID")),
    responses(
        (status = 204, description = "Benchmark result deleted"),
        (status = 404, description = "Benchmark result not found", body = ErrorResponse)
    ),
    tag = "benchmark-results"
)]
#[delete("/api/v1/benchmark-results/{id}")]
pub async fn delete_result(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    service.delete_benchmark_result(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_results)
        .service(create_result)
        .service(get_result)
        .service(update_result)
        .service(delete_result);
}
