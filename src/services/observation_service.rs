use chrono::Utc;

use crate::models::{CreateObservationRequest, ObservationDocument, ObservationResponse};
use crate::state::AppState;
use crate::utils::error::AppError;

pub async fn create_observation(
    state: &AppState,
    request: CreateObservationRequest,
) -> Result<ObservationResponse, AppError> {
    let observation = request.validate().map_err(AppError::Validation)?;
    let document = ObservationDocument::from_new(observation, Utc::now());

    state.observations.insert(&document).await?;
    log::info!(
        "✅ Observation logged: {} by {}",
        document.id.to_hex(),
        document.contributor
    );

    Ok(ObservationResponse::from(document))
}

/// An empty `contributor` is treated the same as no filter.
pub async fn list_observations(
    state: &AppState,
    contributor: Option<&str>,
) -> Result<Vec<ObservationResponse>, AppError> {
    let contributor = contributor.filter(|c| !c.is_empty());

    let observations = state.observations.list(contributor).await?;

    Ok(observations
        .into_iter()
        .map(ObservationResponse::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, TaxonInput, LocationInput};

    fn request(contributor: &str, count: Option<f64>) -> CreateObservationRequest {
        CreateObservationRequest {
            contributor: Some(contributor.to_string()),
            taxon: Some(TaxonInput {
                category: Some("Insect".into()),
                common_name: Some("Monarch".into()),
                ..Default::default()
            }),
            count,
            location: Some(LocationInput {
                kind: Some("Point".into()),
                coordinates: Some(vec![-99.1, 19.4]),
            }),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn create_defaults_count() {
        let state = AppState::in_memory("secret");
        let created = create_observation(&state, request("ann", None)).await.unwrap();

        assert_eq!(created.count, 1);
        assert_eq!(created.location, GeoPoint::new(-99.1, 19.4));
        assert_eq!(created.updated_date, created.created_at);
    }

    #[actix_web::test]
    async fn count_zero_is_not_stored() {
        let state = AppState::in_memory("secret");
        let err = create_observation(&state, request("ann", Some(0.0)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(list_observations(&state, None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn list_filters_and_sorts() {
        let state = AppState::in_memory("secret");
        let first = create_observation(&state, request("ann", None)).await.unwrap();
        let second = create_observation(&state, request("bob", None)).await.unwrap();
        let third = create_observation(&state, request("ann", Some(3.0))).await.unwrap();

        let all = list_observations(&state, None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);

        let ann = list_observations(&state, Some("ann")).await.unwrap();
        assert_eq!(ann.len(), 2);
        assert!(ann.iter().all(|o| o.contributor == "ann"));

        assert!(list_observations(&state, Some("an")).await.unwrap().is_empty());
        assert_eq!(list_observations(&state, Some("")).await.unwrap().len(), 3);
    }
}
