//! User JWT authentication extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{authenticate, AuthenticatedUser};

/// The signed-in user making the request.
///
/// Reuses the identity stored by `require_user_auth` when that middleware
/// ran, and authenticates the bearer token itself otherwise.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) of the access token.
    pub jti: String,
}

impl From<AuthenticatedUser> for UserAuth {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            jti: user.jti,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone().into());
        }

        let user = authenticate(state, &parts.headers).await?;
        parts.extensions.insert(user.clone());
        Ok(user.into())
    }
}
