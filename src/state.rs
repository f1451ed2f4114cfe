use std::sync::Arc;

use crate::config::Config;
use crate::database::{MongoDB, ObservationRepository, UserRepository};
use crate::services::token_service::TokenService;

/// Process-scoped resources shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub observations: Arc<dyn ObservationRepository>,
    pub tokens: TokenService,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(config: &Config, db: &MongoDB) -> Self {
        Self {
            users: Arc::new(db.users()),
            observations: Arc::new(db.observations()),
            tokens: TokenService::new(&config.jwt_secret),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    #[cfg(test)]
    pub fn in_memory(secret: &str) -> Self {
        use crate::database::memory::{InMemoryObservationRepository, InMemoryUserRepository};

        Self {
            users: Arc::new(InMemoryUserRepository::default()),
            observations: Arc::new(InMemoryObservationRepository::default()),
            tokens: TokenService::new(secret),
            bcrypt_cost: crate::config::MIN_BCRYPT_COST,
        }
    }
}
