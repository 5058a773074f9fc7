//! Routes for the signed-in user's own profile and children.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::child::CreateChildRequest;
use domain::models::user::{ProfileResponse, UpdateProfileRequest};
use domain::models::{Child, User};
use persistence::repositories::{ChildRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

#[derive(Debug, Serialize)]
pub struct ListChildrenResponse {
    pub children: Vec<Child>,
}

/// Get the caller's profile.
///
/// GET /api/v1/me
pub async fn get_profile(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(User::from(user).into()))
}

/// Edit name, phone or home address.
///
/// PATCH /api/v1/me
pub async fn update_profile(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    request.validate()?;

    let user = UserRepository::new(state.pool.clone())
        .update_profile(
            user_auth.user_id,
            request.name.as_deref().map(str::trim),
            request.phone.as_deref().map(str::trim),
            request.home_address.as_deref().map(str::trim),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %user_auth.user_id, "Profile updated");
    Ok(Json(User::from(user).into()))
}

/// List the caller's children.
///
/// GET /api/v1/me/children
pub async fn list_children(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ListChildrenResponse>, ApiError> {
    let children = ChildRepository::new(state.pool.clone())
        .list_for_parent(user_auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListChildrenResponse { children }))
}

/// Register a child.
///
/// POST /api/v1/me/children
pub async fn add_child(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateChildRequest>,
) -> Result<(StatusCode, Json<Child>), ApiError> {
    request.validate()?;

    let child: Child = ChildRepository::new(state.pool.clone())
        .create(
            user_auth.user_id,
            request.name.trim(),
            request.phone.as_deref().map(str::trim),
        )
        .await?
        .into();

    info!(child_id = %child.id, parent_id = %user_auth.user_id, "Child added");
    Ok((StatusCode::CREATED, Json(child)))
}

/// Remove a child. Refused while the child has open or accepted rides.
///
/// DELETE /api/v1/me/children/:child_id
pub async fn delete_child(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(child_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ChildRepository::new(state.pool.clone());

    let owned = repo
        .find_by_id(child_id)
        .await?
        .is_some_and(|c| c.parent_id == user_auth.user_id);
    if !owned {
        return Err(ApiError::NotFound("Child not found".to_string()));
    }

    if repo.has_live_rides(child_id).await? {
        return Err(ApiError::Conflict(
            "Child has open or accepted ride requests".to_string(),
        ));
    }

    if !repo.delete_for_parent(child_id, user_auth.user_id).await? {
        return Err(ApiError::NotFound("Child not found".to_string()));
    }

    info!(child_id = %child_id, parent_id = %user_auth.user_id, "Child deleted");
    Ok(StatusCode::NO_CONTENT)
}
