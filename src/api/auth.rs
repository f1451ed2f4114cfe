use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse};

use crate::services::auth_service::{
    self, AuthResponse, LoginRequest, SignupRequest, VerifyTokenResponse,
};
use crate::state::AppState;
use crate::utils::error::AppError;

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Missing field or password too short"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn signup(
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /auth/signup - email: {}", email);

    match auth_service::signup(&state, &request).await {
        Ok(response) => Ok(HttpResponse::Created().json(response)),
        Err(e) => {
            log::warn!("❌ Signup failed: {} - {}", email, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /auth/login - email: {}", email);

    match auth_service::login(&state, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", email);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email, e);
            Err(e)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[utoipa::path(
    get,
    path = "/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_token(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    log::info!("✓ GET /auth/verify");

    let token = bearer_token(&req)
        .ok_or_else(|| AppError::Unauthorized("No valid Authorization header".into()))?;

    match auth_service::verify_token(&state, token) {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            log::warn!("❌ Invalid token: {}", e);
            Err(e)
        }
    }
}
