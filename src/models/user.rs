use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "users";
pub const DEFAULT_TOKEN_VALIDITY: &str = "15m";

fn default_token_validity() -> String {
    DEFAULT_TOKEN_VALIDITY.to_string()
}

/// Stored user, including the password hash. Only loaded for login.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_token_validity")]
    pub token_validity_duration: String,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// User as returned by default queries (password projected out)
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    #[serde(default = "default_token_validity")]
    pub token_validity_duration: String,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl UserDocument {
    /// Builds a fresh record. `password_hash` must already be hashed.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        let now = BsonDateTime::now();
        Self {
            id: ObjectId::new(),
            username: username.trim().to_lowercase(),
            email: email.trim().to_string(),
            password: password_hash,
            token_validity_duration: default_token_validity(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: doc.id,
            username: doc.username,
            email: doc.email,
            token_validity_duration: doc.token_validity_duration,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}
