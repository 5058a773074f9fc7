//! User JWT authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::{AuthError, AuthService};

/// Authenticated user information, placed in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) of the access token.
    pub jti: String,
}

/// Pulls the token out of an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

/// Validates the bearer token against the signing keys and the session table.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ApiError> {
    let token = bearer_token(headers)?;

    let access = AuthService::new(state.pool.clone(), state.jwt.clone())
        .verify_access(token)
        .await
        .map_err(|e| match e {
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            other => {
                tracing::debug!("Access token rejected: {}", other);
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
        })?;

    Ok(AuthenticatedUser {
        user_id: access.user_id,
        jti: access.jti,
    })
}

/// Middleware that requires JWT user authentication.
///
/// Rejects requests without a valid token and live session; otherwise
/// stores [`AuthenticatedUser`] in request extensions.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}
