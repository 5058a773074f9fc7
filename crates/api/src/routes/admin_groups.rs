//! Admin group management: groups and their memberships.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::group::{
    AddMemberRequest, AdminMemberResponse, CreateGroupRequest, UpdateGroupRequest,
};
use domain::models::{Group, User};
use persistence::repositories::{GroupRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;

#[derive(Debug, Serialize)]
pub struct ListGroupsResponse {
    pub groups: Vec<Group>,
}

#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<AdminMemberResponse>,
}

/// All groups, archived ones included.
///
/// GET /api/v1/admin/groups
pub async fn list_groups(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListGroupsResponse { groups }))
}

/// Create a group.
///
/// POST /api/v1/admin/groups
pub async fn create_group(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    request.validate()?;

    let group: Group = GroupRepository::new(state.pool.clone())
        .create(request.name.trim())
        .await?
        .into();

    info!(group_id = %group.id, created_by = %admin.id, "Group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// Rename or archive a group.
///
/// PATCH /api/v1/admin/groups/:group_id
pub async fn update_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(group_id): Path<Uuid>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    request.validate()?;

    let group: Group = GroupRepository::new(state.pool.clone())
        .update(group_id, request.name.as_deref().map(str::trim), request.archived)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?
        .into();

    info!(group_id = %group.id, archived = group.archived, "Group updated");
    Ok(Json(group))
}

/// Members of a group with their contact details.
///
/// GET /api/v1/admin/groups/:group_id/members
pub async fn list_members(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    if repo.find_by_id(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    let members = repo
        .list_members(group_id)
        .await?
        .into_iter()
        .map(|m| m.into_admin_response())
        .collect();

    Ok(Json(ListMembersResponse { members }))
}

/// Add an approved user to a group.
///
/// POST /api/v1/admin/groups/:group_id/members
pub async fn add_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(group_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<StatusCode, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    if groups.find_by_id(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(request.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();
    if !user.is_approved {
        return Err(ApiError::Validation(
            "Only approved users can join a group".to_string(),
        ));
    }

    groups
        .add_member(group_id, user.id)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("User is already a member of this group".to_string())
            }
            other => other,
        })?;

    info!(group_id = %group_id, user_id = %user.id, "Member added to group");
    Ok(StatusCode::CREATED)
}

/// Remove a user from a group. Their existing rides stay.
///
/// DELETE /api/v1/admin/groups/:group_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let removed = GroupRepository::new(state.pool.clone())
        .remove_member(group_id, user_id)
        .await?;

    if !removed {
        return Err(ApiError::NotFound("Membership not found".to_string()));
    }

    info!(group_id = %group_id, user_id = %user_id, "Member removed from group");
    Ok(StatusCode::NO_CONTENT)
}
