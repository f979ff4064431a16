//! REST API endpoints for benchmarks

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::validation;
use crate::model::{Benchmark, BenchmarkCreate, BenchmarkUpdate};
use crate::service::catalogue::CatalogueService;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBenchmarksParams {
    pub skip: Option<i64>,
    /// Maximum records to return (1-1000, default: 100)
    pub limit: Option<i64>,
    /// Filter by category (e.g. Knowledge, Coding, Math)
    pub category: Option<String>,
}

/// List benchmarks
#[utoipa::path(
    get,
    path = "/api/v1/benchmarks",
    params(ListBenchmarksParams),
    responses(
        (status = 200, description = "Benchmarks", body = Vec<Benchmark>),
        (status = 400, description = "Invalid pagination", body = ErrorResponse)
    ),
    tag = "benchmarks"
)]
#[get("/api/v1/benchmarks")]
pub async fn list_benchmarks(
    service: web::Data<CatalogueService>,
    query: web::Query<ListBenchmarksParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(query.skip, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
    let benchmarks = service
        .list_benchmarks(query.category.as_deref(), page)
        .await?;
    Ok(HttpResponse::Ok().json(benchmarks))
}

/// Distinct benchmark categories
#[utoipa::path(
    get,
    path = "/api/v1/benchmarks/categories",
    responses((status = 200, description = "Category names", body = Vec<String>)),
    tag = "benchmarks"
)]
#[get("/api/v1/benchmarks/categories")]
pub async fn list_categories(
    service: web::Data<CatalogueService>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.benchmark_categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/benchmarks/{id}",
    params(("id" = i64, Path, description = "Benchmark ID")),
    responses(
        (status = 200, description = "Benchmark found", body = Benchmark),
        (status = 404, description = "Benchmark not found", body = ErrorResponse)
    ),
    tag = "benchmarks"
)]
#[get("/api/v1/benchmarks/{id}")]
pub async fn get_benchmark(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.get_benchmark(path.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/benchmarks",
    request_body = BenchmarkCreate,
    responses(
        (status = 201, description = "Benchmark created", body = Benchmark),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Benchmark name already exists", body = ErrorResponse)
    ),
    tag = "benchmarks"
)]
#[post("/api/v1/benchmarks")]
pub async fn create_benchmark(
    service: web::Data<CatalogueService>,
    body: web::Json<BenchmarkCreate>,
) -> Result<HttpResponse, ApiError> {
    let create = body.into_inner();
    validation::benchmark_create(&create)?;
    Ok(HttpResponse::Created().json(service.create_benchmark(create).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/benchmarks/{id}",
    params(("id" = i64, Path, description = "Benchmark ID")),
    request_body = BenchmarkUpdate,
    responses(
        (status = 200, description = "Benchmark updated", body = Benchmark),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Benchmark not found", body = ErrorResponse),
        (status = 409, description = "New name already taken", body = ErrorResponse)
    ),
    tag = "benchmarks"
)]
#[patch("/api/v1/benchmarks/{id}")]
pub async fn update_benchmark(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    body: web::Json<BenchmarkUpdate>,
) -> Result<HttpResponse, ApiError> {
    let update = body.into_inner();
    validation::benchmark_update(&update)?;
    Ok(HttpResponse::Ok().json(service.update_benchmark(path.into_inner(), update).await?))
}

/// Delete a benchmark and every result recorded against it
#[utoipa::path(
    delete,
    path = "/api/v1/benchmarks/{id}",
    params(("id" = i64, Path, description = "Benchmark ID")),
    responses(
        (status = 204, description = "Benchmark deleted"),
        (status = 404, description = "Benchmark not found", body = ErrorResponse)
    ),
    tag = "benchmarks"
)]
#[delete("/api/v1/benchmarks/{id}")]
pub async fn delete_benchmark(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    service.delete_benchmark(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(list_benchmarks)
        .service(create_benchmark)
        .service(get_benchmark)
        .service(update_benchmark)
        .service(delete_benchmark);
}
