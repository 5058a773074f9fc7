//! Member-facing group and POI routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::group::MemberDirectoryEntry;
use domain::models::{Group, Poi};
use persistence::repositories::{GroupRepository, PoiRepository};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

#[derive(Debug, Serialize)]
pub struct ListGroupsResponse {
    pub groups: Vec<Group>,
}

#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberDirectoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct ListPoisResponse {
    pub pois: Vec<Poi>,
}

/// Non-archived groups the caller belongs to.
///
/// GET /api/v1/groups
pub async fn list_my_groups(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone())
        .list_for_user(user_auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListGroupsResponse { groups }))
}

/// Names of fellow members. Only members may look.
///
/// GET /api/v1/groups/:group_id/members
pub async fn list_group_members(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());

    if !repo.is_member(group_id, user_auth.user_id).await? {
        return Err(ApiError::Forbidden(
            "You are not a member of this group".to_string(),
        ));
    }

    let members = repo
        .list_members(group_id)
        .await?
        .into_iter()
        .map(|m| m.into_directory_entry())
        .collect();

    Ok(Json(ListMembersResponse { members }))
}

/// Destinations that can be picked for a new ride.
///
/// GET /api/v1/pois
pub async fn list_pois(
    State(state): State<AppState>,
    _user_auth: UserAuth,
) -> Result<Json<ListPoisResponse>, ApiError> {
    let pois = PoiRepository::new(state.pool.clone())
        .list(false)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListPoisResponse { pois }))
}
