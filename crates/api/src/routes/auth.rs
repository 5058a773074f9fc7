//! Authentication routes for signup, login, and token management.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::ProfileResponse;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::{AuthService, Signup, TokenPair};

/// Request body for signup.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Strength rules are checked by the auth service.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    #[validate(
        length(min = 1, max = 300, message = "Home address must be 1-300 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub home_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub user: ProfileResponse,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: ProfileResponse,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogoutRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,

    /// End every session of the user, not just this one.
    #[serde(default)]
    pub all_devices: bool,
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.jwt.clone())
}

/// Create an account awaiting admin approval.
///
/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    request.validate()?;

    let user = auth_service(&state)
        .signup(Signup {
            email: &request.email,
            password: &request.password,
            name: &request.name,
            phone: &request.phone,
            home_address: &request.home_address,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.into(),
            message: "Account created. An administrator must approve it before you can log in."
                .to_string(),
        }),
    ))
}

/// Login with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let (user, tokens) = auth_service(&state)
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        user: user.into(),
        tokens,
    }))
}

/// Rotate a refresh token into a new token pair.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    request.validate()?;

    let tokens = auth_service(&state).refresh(&request.refresh_token).await?;
    Ok(Json(tokens))
}

/// End the session owning the refresh token.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    auth_service(&state)
        .logout(&request.refresh_token, request.all_devices)
        .await?;

    info!(all_devices = request.all_devices, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}
