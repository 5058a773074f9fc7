//! Admin authorization extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::User;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::user_auth::UserAuth;

/// A signed-in, approved user with the admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl AdminUser {
    fn check(user: User) -> Result<Self, ApiError> {
        if user.is_admin && user.is_approved {
            Ok(Self(user))
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = UserAuth::from_request_parts(parts, state).await?;

        let user: User = UserRepository::new(state.pool.clone())
            .find_by_id(auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?
            .into();

        Self::check(user)
    }
}
