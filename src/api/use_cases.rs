//! REST API endpoints for use cases

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::validation;
use crate::model::{UseCase, UseCaseCreate, UseCaseUpdate};
use crate::service::catalogue::CatalogueService;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUseCasesParams {
    pub model_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/use-cases",
    params(ListUseCasesParams),
    responses(
        (status = 200, description = "Use cases", body = Vec<UseCase>),
        (status = 400, description = "Invalid pagination", body = ErrorResponse)
    ),
    tag = "use-cases"
)]
#[get("/api/v1/use-cases")]
pub async fn list_use_cases(
    service: web::Data<CatalogueService>,
    query: web::Query<ListUseCasesParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(query.skip, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
    Ok(HttpResponse::Ok().json(service.list_use_cases(query.model_id, page).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/use-cases/{id}",
    params(("id" = i64, Path, description = "Use case ID")),
    responses(
        (status = 200, description = "Use case found", body = UseCase),
        (status = 404, description = "Use case not found", body = ErrorResponse)
    ),
    tag = "use-cases"
)]
#[get("/api/v1/use-cases/{id}")]
pub async fn get_use_case(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.get_use_case(path.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/use-cases",
    request_body = UseCaseCreate,
    responses(
        (status = 201, description = "Use case created", body = UseCase),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "use-cases"
)]
#[post("/api/v1/use-cases")]
pub async fn create_use_case(
    service: web::Data<CatalogueService>,
    body: web::Json<UseCaseCreate>,
) -> Result<HttpResponse, ApiError> {
    let create = body.into_inner();
    validation::use_case_create(&create)?;
    Ok(HttpResponse::Created().json(service.create_use_case(create).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/use-cases/{id}",
    params(("id" = i64, Path, description = "Use case ID")),
    request_body = UseCaseUpdate,
    responses(
        (status = 200, description = "Use case updated", body = UseCase),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Use case not found", body = ErrorResponse)
    ),
    tag = "use-cases"
)]
#[patch("/api/v1/use-cases/{id}")]
pub async fn update_use_case(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    body: web::Json<UseCaseUpdate>,
) -> Result<HttpResponse, ApiError> {
    let update = body.into_inner();
    validation::use_case_update(&update)?;
    Ok(HttpResponse::Ok().json(service.update_use_case(path.into_inner(), update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/use-cases/{id}",
    params(("id" = i64, Path, description = "Use case ID")),
    responses(
        (status = 204, description = "Use case deleted"),
        (status = 404, description = "Use case not found", body = ErrorResponse)
    ),
    tag = "use-cases"
)]
#[delete("/api/v1/use-cases/{id}")]
pub async fn delete_use_case(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    service.delete_use_case(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_use_cases)
        .service(create_use_case)
        .service(get_use_case)
        .service(update_use_case)
        .service(delete_use_case);
}
