use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::models::{CreateObservationRequest, ObservationResponse};
use crate::services::observation_service;
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Exact contributor to filter by
    pub contributor: Option<String>,
}

#[utoipa::path(
    post,
    path = "/observations",
    tag = "Observations",
    request_body = CreateObservationRequest,
    responses(
        (status = 201, description = "Observation stored", body = ObservationResponse),
        (status = 400, description = "Invalid observation fields")
    )
)]
pub async fn create_observation(
    state: web::Data<AppState>,
    request: web::Json<CreateObservationRequest>,
) -> Result<HttpResponse, AppError> {
    match observation_service::create_observation(&state, request.into_inner()).await {
        Ok(observation) => Ok(HttpResponse::Created().json(observation)),
        Err(e) => {
            log::error!("❌ Observation submission error: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/observations",
    tag = "Observations",
    params(ListQuery),
    responses(
        (status = 200, description = "Observations, newest first", body = [ObservationResponse])
    )
)]
pub async fn list_observations(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let observations =
        observation_service::list_observations(&state, query.contributor.as_deref())
            .await
            .map_err(|e| {
                log::error!("❌ Fetch observations error: {}", e);
                e
            })?;

    Ok(HttpResponse::Ok().json(observations))
}
