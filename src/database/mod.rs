pub mod repository;

#[cfg(test)]
pub mod memory;

pub use repository::*;

use crate::models::{ObservationDocument, UserDocument, OBSERVATIONS_COLLECTION, USERS_COLLECTION};
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use std::time::Duration;

const DEFAULT_DB_NAME: &str = "ecotrace";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    /// Connects, verifies the connection with a round trip and ensures indexes.
    pub async fn new(uri: &str) -> mongodb::error::Result<Self> {
        let mut client_options = ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        db.list_collection_names().await?;
        log::info!("✅ Connected to MongoDB database: {}", db_name);

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<Document>(USERS_COLLECTION);
        for field in ["email", "username"] {
            let mut keys = Document::new();
            keys.insert(field, 1);
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();

            match users.create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: users({}) unique", field),
                Err(e) => log::warn!("   ⚠️  Could not create users({}) index: {}", field, e),
            }
        }

        let observations = self.collection::<Document>(OBSERVATIONS_COLLECTION);

        // Geo index for future proximity queries
        let geo_index = IndexModel::builder()
            .keys(doc! { "location": "2dsphere" })
            .build();
        observations.create_index(geo_index).await?;
        log::info!("   ✅ Index created: observations(location) 2dsphere");

        let listing_index = IndexModel::builder()
            .keys(doc! { "contributor": 1, "createdAt": -1 })
            .build();
        match observations.create_index(listing_index).await {
            Ok(_) => log::info!("   ✅ Index created: observations(contributor, createdAt)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn users(&self) -> MongoUserRepository {
        MongoUserRepository::new(self.collection::<UserDocument>(USERS_COLLECTION))
    }

    pub fn observations(&self) -> MongoObservationRepository {
        MongoObservationRepository::new(
            self.collection::<ObservationDocument>(OBSERVATIONS_COLLECTION),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/ecotrace_test".to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }
}
