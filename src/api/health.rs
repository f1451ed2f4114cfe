use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` when the observation store answered, `"degraded"` otherwise
    pub status: String,
    pub version: String,
    /// `null` while the store is unreachable
    pub observations: Option<u64>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service banner", body = String, content_type = "text/plain")
    )
)]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("EcoTrace Backend is Running!")
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Observation store reachable", body = HealthResponse),
        (status = 503, description = "Observation store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let observations = match state.observations.estimated_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            log::error!("❌ Health check could not reach the observation store: {}", e);
            None
        }
    };

    let body = HealthResponse {
        status: if observations.is_some() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        observations,
        checked_at: chrono::Utc::now(),
    };

    match body.observations {
        Some(_) => HttpResponse::Ok().json(body),
        None => HttpResponse::ServiceUnavailable().json(body),
    }
}
