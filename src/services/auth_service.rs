use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};

use crate::models::UserDocument;
use crate::state::AppState;
use crate::utils::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

// Request/Response structures
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub exp: usize,
}

/// Signup fields that passed validation
#[derive(Debug, PartialEq, Eq)]
pub struct ValidSignup {
    pub email: String,
    pub password: String,
    pub name: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Emails are stored and looked up trimmed
fn trimmed_email(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Length in UTF-16 code units, the way browsers and the original clients count
fn password_length(password: &str) -> usize {
    password.encode_utf16().count()
}

impl SignupRequest {
    /// Checks fields in order and reports the first failure.
    pub fn validate(&self) -> Result<ValidSignup, AppError> {
        let email = trimmed_email(&self.email).ok_or_else(|| AppError::BadRequest("No Email".into()))?;
        let password =
            present(&self.password).ok_or_else(|| AppError::BadRequest("No Password".into()))?;
        let name = present(&self.name).ok_or_else(|| AppError::BadRequest("No Name".into()))?;

        if password_length(password) < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest("Password too short".into()));
        }

        Ok(ValidSignup {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        })
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &stored))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

fn auth_response(state: &AppState, user: &UserDocument) -> Result<AuthResponse, AppError> {
    let token = state
        .tokens
        .issue(&user.id.to_hex(), &user.token_validity_duration)?;

    Ok(AuthResponse {
        token,
        user: UserInfo {
            name: user.username.clone(),
            email: user.email.clone(),
        },
    })
}

// User signup
pub async fn signup(state: &AppState, request: &SignupRequest) -> Result<AuthResponse, AppError> {
    let signup = request.validate()?;

    if state.users.find_by_email(&signup.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let hashed = hash_password(signup.password, state.bcrypt_cost).await?;
    let user = UserDocument::new(&signup.name, &signup.email, hashed);

    state.users.insert(&user).await?;
    log::info!("✅ User created successfully: {}", user.email);

    auth_response(state, &user)
}

// User login
pub async fn login(state: &AppState, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let email = trimmed_email(&request.email).ok_or_else(|| AppError::BadRequest("No Email".into()))?;
    let password =
        present(&request.password).ok_or_else(|| AppError::BadRequest("No Password".into()))?;

    let user = state
        .users
        .find_credentials(email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("No user found".into()))?;

    if !verify_password(password.to_string(), user.password.clone()).await? {
        return Err(AppError::Unauthorized("Incorrect password".into()));
    }

    auth_response(state, &user)
}

// Verify a bearer token
pub fn verify_token(state: &AppState, token: &str) -> Result<VerifyTokenResponse, AppError> {
    let claims = state
        .tokens
        .verify(token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    Ok(VerifyTokenResponse {
        valid: true,
        user_id: claims.sub,
        exp: claims.exp,
    })
}
