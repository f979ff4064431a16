//! REST API endpoints for models

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::validation;
use crate::model::{BenchmarkResult, ModelCreate, ModelRecord, ModelUpdate, Opinion, UseCase};
use crate::service::catalogue::{CatalogueService, ModelCatalogue};

const LIST_DEFAULT_LIMIT: i64 = 10;
const LIST_MAX_LIMIT: i64 = 1000;
const SEARCH_DEFAULT_LIMIT: i64 = 20;
const SEARCH_MAX_LIMIT: i64 = 100;
const SUBRESOURCE_DEFAULT_LIMIT: i64 = 100;

/// Query parameters for listing models
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListModelsParams {
    /// Number of records to skip (default: 0)
    pub skip: Option<i64>,
    /// Maximum records to return (1-1000, default: 10)
    pub limit: Option<i64>,
    /// Only models from this organization, newest release first
    pub organization: Option<String>,
}

/// Query parameters for searching models
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchModelsParams {
    /// Search term matched against name, display name and organization (min 2 characters)
    pub q: String,
    pub skip: Option<i64>,
    /// Maximum records to return (1-100, default: 20)
    pub limit: Option<i64>,
}

/// Pagination for a model's sub-resources
#[derive(Debug, Deserialize, IntoParams)]
pub struct SubresourceParams {
    pub skip: Option<i64>,
    /// Maximum records to return (1-1000, default: 100)
    pub limit: Option<i64>,
}

/// List models
#[utoipa::path(
    get,
    path = "/api/v1/models",
    params(ListModelsParams),
    responses(
        (status = 200, description = "Models retrieved successfully", body = Vec<ModelRecord>),
        (status = 400, description = "Invalid pagination", body = ErrorResponse)
    ),
    tag = "models"
)]
#[get("/api/v1/models")]
pub async fn list_models(
    service: web::Data<CatalogueService>,
    query: web::Query<ListModelsParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(query.skip, query.limit, LIST_DEFAULT_LIMIT, LIST_MAX_LIMIT)?;

    let models = match query.organization.as_deref() {
        Some(org) => service.list_models_by_organization(org, page).await?,
        None => service.list_models(page).await?,
    };

    Ok(HttpResponse::Ok().json(models))
}

/// Search models by name, display name or organization (case-insensitive)
#[utoipa::path(
    get,
    path = "/api/v1/models/search",
    params(SearchModelsParams),
    responses(
        (status = 200, description = "Matching models", body = Vec<ModelRecord>),
        (status = 400, description = "Search term too short", body = ErrorResponse)
    ),
    tag = "models"
)]
#[get("/api/v1/models/search")]
pub async fn search_models(
    service: web::Data<CatalogueService>,
    query: web::Query<SearchModelsParams>,
) -> Result<HttpResponse, ApiError> {
    let term = validation::search_term(&query.q)?;
    let page =
        validation::pagination(query.skip, query.limit, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT)?;

    let models = service.search_models(term, page).await?;
    tracing::debug!(q = %term, results = models.len(), "Model search");

    Ok(HttpResponse::Ok().json(models))
}

/// Get a model by its unique name
#[utoipa::path(
    get,
    path = "/api/v1/models/name/{name}",
    params(("name" = String, Path, description = "Model name, e.g. gpt-4")),
    responses(
        (status = 200, description = "Model found", body = ModelRecord),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "models"
)]
#[get("/api/v1/models/name/{name}")]
pub async fn get_model_by_name(
    service: web::Data<CatalogueService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let model = service.get_model_by_name(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(model))
}

/// Get a model by ID
#[utoipa::path(
    get,
    path = "/api/v1/models/{id}",
    params(("id" = i64, Path, description = "Model ID")),
    responses(
        (status = 200, description = "Model found", body = ModelRecord),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "models"
)]
#[get("/api/v1/models/{id}")]
pub async fn get_model(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let model = service.get_model(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(model))
}

/// Create a model
#[utoipa::path(
    post,
    path = "/api/v1/models",
    request_body = ModelCreate,
    responses(
        (status = 201, description = "Model created", body = ModelRecord),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "A model with this name already exists", body = ErrorResponse)
    ),
    tag = "models"
)]
#[post("/api/v1/models")]
pub async fn create_model(
    service: web::Data<CatalogueService>,
    body: web::Json<ModelCreate>,
) -> Result<HttpResponse, ApiError> {
    let create = body.into_inner();
    validation::model_create(&create)?;

    let model = service.create_model(create).await?;
    Ok(HttpResponse::Created().json(model))
}

/// Partially update a model
#[utoipa::path(
    patch,
    path = "/api/v1/models/{id}",
    params(("id" = i64, Path, description = "Model ID")),
    request_body = ModelUpdate,
    responses(
        (status = 200, description = "Model updated", body = ModelRecord),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse),
        (status = 409, description = "New name already taken", body = ErrorResponse)
    ),
    tag = "models"
)]
#[patch("/api/v1/models/{id}")]
pub async fn update_model(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    body: web::Json<ModelUpdate>,
) -> Result<HttpResponse, ApiError> {
    let update = body.into_inner();
    validation::model_update(&update)?;

    let model = service.update_model(path.into_inner(), update).await?;
    Ok(HttpResponse::Ok().json(model))
}

/// Delete a model together with its results, opinions and use cases
#[utoipa::path(
    delete,
    path = "/api/v1/models/{id}",
    params(("id" = i64, Path, description = "Model ID")),
    responses(
        (status = 204, description = "Model deleted"),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "models"
)]
#[delete("/api/v1/models/{id}")]
pub async fn delete_model(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    service.delete_model(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Benchmark results recorded for a model
#[utoipa::path(
    get,
    path = "/api/v1/models/{id}/benchmarks",
    params(("id" = i64, Path, description = "Model ID"), SubresourceParams),
    responses(
        (status = 200, description = "Benchmark results", body = Vec<BenchmarkResult>),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "models"
)]
#[get("/api/v1/models/{id}/benchmarks")]
pub async fn model_benchmarks(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    query: web::Query<SubresourceParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(
        query.skip,
        query.limit,
        SUBRESOURCE_DEFAULT_LIMIT,
        LIST_MAX_LIMIT,
    )?;
    let results = service
        .model_benchmark_results(path.into_inner(), page)
        .await?;
    Ok(HttpResponse::Ok().json(results))
}

/// Opinions about a model
#[utoipa::path(
    get,
    path = "/api/v1/models/{id}/opinions",
    params(("id" = i64, Path, description = "Model ID"), SubresourceParams),
    responses(
        (status = 200, description = "Opinions", body = Vec<Opinion>),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "models"
)]
#[get("/api/v1/models/{id}/opinions")]
pub async fn model_opinions(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    query: web::Query<SubresourceParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(
        query.skip,
        query.limit,
        SUBRESOURCE_DEFAULT_LIMIT,
        LIST_MAX_LIMIT,
    )?;
    let opinions = service.model_opinions(path.into_inner(), page).await?;
    Ok(HttpResponse::Ok().json(opinions))
}

/// Use cases mentioned for a model
#[utoipa::path(
    get,
    path = "/api/v1/models/{id}/use-cases",
    params(("id" = i64, Path, description = "Model ID"), SubresourceParams),
    responses(
        (status = 200, description = "Use cases", body = Vec<UseCase>),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "models"
)]
#[get("/api/v1/models/{id}/use-cases")]
pub async fn model_use_cases(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    query: web::Query<SubresourceParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(
        query.skip,
        query.limit,
        SUBRESOURCE_DEFAULT_LIMIT,
        LIST_MAX_LIMIT,
    )?;
    let use_cases = service.model_use_cases(path.into_inner(), page).await?;
    Ok(HttpResponse::Ok().json(use_cases))
}

/// Configure model routes. Literal segments go before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_models)
        .service(get_model_by_name)
        .service(list_models)
        .service(create_model)
        .service(model_benchmarks)
        .service(model_opinions)
        .service(model_use_cases)
        .service(get_model)
        .service(update_model)
        .service(delete_model);
}
