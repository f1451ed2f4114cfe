use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EcoTrace API",
        version = "1.0.0",
        description = "Citizen-science wildlife observations. \n\n**Authentication:** signup and login issue JWT bearer tokens."
    ),
    paths(
        crate::api::health::index,
        crate::api::health::health_check,
        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::verify_token,
        crate::api::observations::create_observation,
        crate::api::observations::list_observations,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::UserInfo,
            crate::services::auth_service::VerifyTokenResponse,
            crate::models::CreateObservationRequest,
            crate::models::ObservationResponse,
            crate::models::Taxon,
            crate::models::Photo,
            crate::models::GeoPoint,
            crate::utils::error::FieldError,
        )
    ),
    tags(
        (name = "Health", description = "Service banner and health check."),
        (name = "Auth", description = "Email/password signup and login."),
        (name = "Observations", description = "Submit and list geotagged species sightings."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/auth/signup",
            "/auth/login",
            "/auth/verify",
            "/observations",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
