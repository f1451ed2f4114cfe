use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use crate::models::{ObservationDocument, User, UserDocument};
use crate::utils::error::AppError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Default lookup. The password hash is never loaded.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Lookup for credential checks, password hash included.
    async fn find_credentials(&self, email: &str) -> Result<Option<UserDocument>, AppError>;

    async fn insert(&self, user: &UserDocument) -> Result<(), AppError>;
}

#[async_trait]
pub trait ObservationRepository: Send + Sync {
    async fn insert(&self, observation: &ObservationDocument) -> Result<(), AppError>;

    /// Newest first. `None` returns every observation.
    async fn list(&self, contributor: Option<&str>) -> Result<Vec<ObservationDocument>, AppError>;

    /// Approximate number of stored observations, read from collection metadata.
    async fn estimated_count(&self) -> Result<u64, AppError>;
}

pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(collection: Collection<UserDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = self
            .collection
            .clone_with_type::<User>()
            .find_one(doc! { "email": email })
            .projection(doc! { "password": 0 })
            .await?;
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserDocument>, AppError> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn insert(&self, user: &UserDocument) -> Result<(), AppError> {
        self.collection.insert_one(user).await?;
        Ok(())
    }
}

pub struct MongoObservationRepository {
    collection: Collection<ObservationDocument>,
}

impl MongoObservationRepository {
    pub fn new(collection: Collection<ObservationDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl ObservationRepository for MongoObservationRepository {
    async fn insert(&self, observation: &ObservationDocument) -> Result<(), AppError> {
        self.collection.insert_one(observation).await?;
        Ok(())
    }

    async fn list(&self, contributor: Option<&str>) -> Result<Vec<ObservationDocument>, AppError> {
        let filter = match contributor {
            Some(c) => doc! { "contributor": c },
            None => doc! {},
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;

        let observations: Vec<ObservationDocument> = cursor.try_collect().await?;
        Ok(observations)
    }

    async fn estimated_count(&self) -> Result<u64, AppError> {
        let count = self.collection.estimated_document_count().await?;
        Ok(count)
    }
}
