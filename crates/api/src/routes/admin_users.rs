//! Admin user management: listing accounts and approving signups.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::user::{AdminUserResponse, ListUsersQuery};
use domain::models::User;
use persistence::repositories::UserRepository;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<AdminUserResponse>,
}

/// List users, optionally only those awaiting approval.
///
/// GET /api/v1/admin/users?pending=true
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone())
        .list_users(query.pending)
        .await?
        .into_iter()
        .map(|u| User::from(u).into())
        .collect();

    Ok(Json(ListUsersResponse { users }))
}

/// Approve a pending signup. Approving twice is harmless.
///
/// POST /api/v1/admin/users/:user_id/approve
pub async fn approve_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AdminUserResponse>, ApiError> {
    let user: User = UserRepository::new(state.pool.clone())
        .approve(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    info!(user_id = %user.id, approved_by = %admin.id, "User approved");
    Ok(Json(user.into()))
}
