pub mod auth_service;
pub mod observation_service;
pub mod token_service;
