mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::middleware::{RateLimit, RateLimiter, SecurityHeaders};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting EcoTrace Service...");

    // The server only starts once the database answered
    let db = match database::MongoDB::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    let state = web::Data::new(AppState::new(&config, &db));
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max,
        config.rate_limit_window,
    ));

    log::info!(
        "🛡️  Rate limit: {} requests per {}s",
        config.rate_limit_max,
        config.rate_limit_window.as_secs()
    );

    let openapi = api::swagger::ApiDoc::openapi();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(RateLimit::new(limiter.clone()))
            .wrap(cors)
            .wrap(SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
    })
    .bind(config.bind_address())?;

    log::info!("🌐 Server running on port {}", config.port);
    log::info!("   Accessible at http://{}", config.bind_address());
    utils::network::log_lan_addresses(config.port);
    log::info!(
        "📚 Swagger UI available at: http://{}/swagger-ui/",
        config.bind_address()
    );

    server.run().await
}
