//! Health check endpoints for liveness and readiness probes

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::service::extraction::ModelExtractionService;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessStatus {
    pub status: String,
    pub version: String,
    pub dependencies: DependencyHealth,
}

#[derive(Serialize, ToSchema)]
pub struct DependencyHealth {
    pub database: String,
    /// `configured` or `disabled`; extraction is optional for readiness
    pub llm: String,
}

/// Service banner
#[derive(Serialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
    pub version: String,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is operational", body = ServiceInfo)),
    tag = "health"
)]
#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfo {
        message: "Model Catalogue API".to_string(),
        status: "operational".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Liveness probe endpoint
///
/// Always returns 200 OK if the service is running.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe endpoint
///
/// Returns 200 OK when the database answers. A missing LLM key is reported
/// but does not make the service unready; the catalogue still works.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessStatus),
        (status = 503, description = "Service is not ready", body = ReadinessStatus)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(
    db_pool: web::Data<PgPool>,
    extractor: web::Data<Option<ModelExtractionService>>,
) -> impl Responder {
    let db_status = match crate::db::ping(db_pool.get_ref()).await {
        Ok(()) => {
            tracing::debug!("Database health check passed");
            "healthy"
        }
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            "unhealthy"
        }
    };

    let llm_status = match extractor.as_ref() {
        Some(_) => "configured",
        None => "disabled",
    };

    let ready = db_status == "healthy";

    let status = ReadinessStatus {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies: DependencyHealth {
            database: db_status.to_string(),
            llm: llm_status.to_string(),
        },
    };

    if ready {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(root).service(liveness).service(readiness);
}
