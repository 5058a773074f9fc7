//! Ride request routes: the group feed, creation, and lifecycle transitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use domain::models::ride_request::CreateRideRequest;
use domain::models::{RideRequest, RideRequestView};
use domain::services::{Feed, FeedQuery, RideError, RideRequestService, RideStore};
use persistence::repositories::RideRequestRepository;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::{record_ride_created, record_ride_transition};

type RideService = RideRequestService<RideRequestRepository>;

fn ride_service(state: &AppState) -> RideService {
    RideRequestService::new(RideRequestRepository::new(state.pool.clone()))
        .with_stale_after(Duration::hours(state.config.rides.stale_after_hours))
}

/// Projects a ride the actor has just written for the actor.
///
/// Skips the membership check of `view`: the write already proved the
/// actor is a participant.
async fn ride_response(
    service: &RideService,
    actor: Uuid,
    ride: &RideRequest,
) -> Result<Json<RideRequestView>, ApiError> {
    let details = service
        .store()
        .find_ride_details(ride.id)
        .await
        .map_err(RideError::from)?
        .ok_or_else(|| ApiError::NotFound("Ride request not found".to_string()))?;

    Ok(Json(RideRequestView::for_viewer(details, actor)))
}

/// Ride feed of a group.
///
/// GET /api/v1/groups/:group_id/rides?view=open|mine|accepted|all
pub async fn get_feed(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Feed<RideRequestView>>, ApiError> {
    let feed = ride_service(&state)
        .feed(user_auth.user_id, group_id, query.view, Utc::now())
        .await?;

    Ok(Json(feed))
}

/// Create a ride request for today or tomorrow.
///
/// POST /api/v1/groups/:group_id/rides
pub async fn create_ride(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<CreateRideRequest>,
) -> Result<(StatusCode, Json<RideRequestView>), ApiError> {
    let service = ride_service(&state);
    let ride = service
        .create(user_auth.user_id, group_id, request, Utc::now())
        .await?;
    record_ride_created();

    let response = ride_response(&service, user_auth.user_id, &ride).await?;
    Ok((StatusCode::CREATED, response))
}

/// A single ride, with contact details when the caller may see them.
///
/// GET /api/v1/rides/:ride_id
pub async fn get_ride(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideRequestView>, ApiError> {
    let view = ride_service(&state).view(user_auth.user_id, ride_id).await?;
    Ok(Json(view))
}

/// Take an open ride.
///
/// POST /api/v1/rides/:ride_id/accept
pub async fn accept_ride(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideRequestView>, ApiError> {
    let service = ride_service(&state);
    let ride = service
        .accept(user_auth.user_id, ride_id, Utc::now())
        .await?;

    record_ride_transition("accept");
    info!(ride_id = %ride_id, actor = %user_auth.user_id, "Ride request accepted");
    ride_response(&service, user_auth.user_id, &ride).await
}

/// Give an accepted ride back to the open pool.
///
/// POST /api/v1/rides/:ride_id/unaccept
pub async fn unaccept_ride(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideRequestView>, ApiError> {
    let service = ride_service(&state);
    let ride = service
        .unaccept(user_auth.user_id, ride_id, Utc::now())
        .await?;

    record_ride_transition("unaccept");
    info!(ride_id = %ride_id, actor = %user_auth.user_id, "Ride request unaccepted");
    ride_response(&service, user_auth.user_id, &ride).await
}

/// Mark an accepted ride as done.
///
/// POST /api/v1/rides/:ride_id/complete
pub async fn complete_ride(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideRequestView>, ApiError> {
    let service = ride_service(&state);
    let ride = service
        .complete(user_auth.user_id, ride_id, Utc::now())
        .await?;

    record_ride_transition("complete");
    info!(ride_id = %ride_id, actor = %user_auth.user_id, "Ride request completed");
    ride_response(&service, user_auth.user_id, &ride).await
}

/// Withdraw an open ride.
///
/// POST /api/v1/rides/:ride_id/cancel
pub async fn cancel_ride(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<RideRequestView>, ApiError> {
    let service = ride_service(&state);
    let ride = service
        .cancel(user_auth.user_id, ride_id, Utc::now())
        .await?;

    record_ride_transition("cancel");
    info!(ride_id = %ride_id, actor = %user_auth.user_id, "Ride request cancelled");
    ride_response(&service, user_auth.user_id, &ride).await
}
