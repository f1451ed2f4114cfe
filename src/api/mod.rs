pub mod auth;
pub mod health;
pub mod observations;
pub mod swagger;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::utils::error::AppError;

/// Body limit matches the usual express.json() default
const JSON_LIMIT: usize = 100 * 1024;

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("❌ Invalid JSON body on {}: {}", req.path(), err);
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(json_error)
}

/// Registers every route. Shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(health::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/observations")
                .route("", web::post().to(observations::create_observation))
                .route("", web::get().to(observations::list_observations)),
        )
        .service(
            web::scope("/auth")
                .route("/signup", web::post().to(auth::signup))
                .route("/login", web::post().to(auth::login))
                .route("/verify", web::get().to(auth::verify_token)),
        );
}
