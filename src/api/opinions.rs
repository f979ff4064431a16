//! REST API endpoints for opinions

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::validation;
use crate::db::repository::OpinionFilter;
use crate::model::{Opinion, OpinionCreate, OpinionUpdate};
use crate::service::catalogue::CatalogueService;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;
const SEARCH_DEFAULT_LIMIT: i64 = 20;
const SEARCH_MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOpinionsParams {
    pub model_id: Option<i64>,
    /// Case-insensitive sentiment filter (e.g. positive, negative, neutral)
    pub sentiment: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchOpinionsParams {
    /// Text to look for in opinion content (min 2 characters)
    pub q: String,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// List opinions, most recently published first
#[utoipa::path(
    get,
    path = "/api/v1/opinions",
    params(ListOpinionsParams),
    responses(
        (status = 200, description = "Opinions", body = Vec<Opinion>),
        (status = 400, description = "Invalid pagination", body = ErrorResponse)
    ),
    tag = "opinions"
)]
#[get("/api/v1/opinions")]
pub async fn list_opinions(
    service: web::Data<CatalogueService>,
    query: web::Query<ListOpinionsParams>,
) -> Result<HttpResponse, ApiError> {
    let page = validation::pagination(query.skip, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
    let filter = OpinionFilter {
        model_id: query.model_id,
        sentiment: query.sentiment.clone(),
    };
    Ok(HttpResponse::Ok().json(service.list_opinions(&filter, page).await?))
}

/// Search opinion content (case-insensitive)
#[utoipa::path(
    get,
    path = "/api/v1/opinions/search",
    params(SearchOpinionsParams),
    responses(
        (status = 200, description = "Matching opinions", body = Vec<Opinion>),
        (status = 400, description = "Search term too short", body = ErrorResponse)
    ),
    tag = "opinions"
)]
#[get("/api/v1/opinions/search")]
pub async fn search_opinions(
    service: web::Data<CatalogueService>,
    query: web::Query<SearchOpinionsParams>,
) -> Result<HttpResponse, ApiError> {
    let term = validation::search_term(&query.q)?;
    let page =
        validation::pagination(query.skip, query.limit, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT)?;
    Ok(HttpResponse::Ok().json(service.search_opinions(term, page).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/opinions/{id}",
    params(("id" = i64, Path, description = "Opinion ID")),
    responses(
        (status = 200, description = "Opinion found", body = Opinion),
        (status = 404, description = "Opinion not found", body = ErrorResponse)
    ),
    tag = "opinions"
)]
#[get("/api/v1/opinions/{id}")]
pub async fn get_opinion(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.get_opinion(path.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/opinions",
    request_body = OpinionCreate,
    responses(
        (status = 201, description = "Opinion created", body = Opinion),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "opinions"
)]
#[post("/api/v1/opinions")]
pub async fn create_opinion(
    service: web::Data<CatalogueService>,
    body: web::Json<OpinionCreate>,
) -> Result<HttpResponse, ApiError> {
    let create = body.into_inner();
    validation::opinion_create(&create)?;
    Ok(HttpResponse::Created().json(service.create_opinion(create).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/opinions/{id}",
    params(("id" = i64, Path, description = "Opinion ID")),
    request_body = OpinionUpdate,
    responses(
        (status = 200, description = "Opinion updated", body = Opinion),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Opinion not found", body = ErrorResponse)
    ),
    tag = "opinions"
)]
#[patch("/api/v1/opinions/{id}")]
pub async fn update_opinion(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
    body: web::Json<OpinionUpdate>,
) -> Result<HttpResponse, ApiError> {
    let update = body.into_inner();
    validation::opinion_update(&update)?;
    Ok(HttpResponse::Ok().json(service.update_opinion(path.into_inner(), update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/opinions/{id}",
    params(("id" = i64, Path, description = "Opinion ID")),
    responses(
        (status = 204, description = "Opinion deleted"),
        (status = 404, description = "Opinion not found", body = ErrorResponse)
    ),
    tag = "opinions"
)]
#[delete("/api/v1/opinions/{id}")]
pub async fn delete_opinion(
    service: web::Data<CatalogueService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    service.delete_opinion(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_opinions)
        .service(list_opinions)
        .service(create_opinion)
        .service(get_opinion)
        .service(update_opinion)
        .service(delete_opinion);
}
