//! In-memory repositories used by the handler tests. They mirror the unique
//! indexes the MongoDB collections carry.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{ObservationRepository, UserRepository};
use crate::models::{ObservationDocument, User, UserDocument};
use crate::utils::error::AppError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserDocument>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.find_credentials(email).await?.map(User::from))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserDocument>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &UserDocument) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::Database(
                "E11000 duplicate key error collection: users".to_string(),
            ));
        }
        users.push(user.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryObservationRepository {
    observations: Mutex<Vec<ObservationDocument>>,
}

#[async_trait]
impl ObservationRepository for InMemoryObservationRepository {
    async fn insert(&self, observation: &ObservationDocument) -> Result<(), AppError> {
        self.observations.lock().unwrap().push(observation.clone());
        Ok(())
    }

    async fn list(&self, contributor: Option<&str>) -> Result<Vec<ObservationDocument>, AppError> {
        let mut found: Vec<ObservationDocument> = self
            .observations
            .lock()
            .unwrap()
            .iter()
            .filter(|o| contributor.map_or(true, |c| o.contributor == c))
            .cloned()
            .collect();

        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(found)
    }

    async fn estimated_count(&self) -> Result<u64, AppError> {
        Ok(self.observations.lock().unwrap().len() as u64)
    }
}
