//! Admin management of points of interest.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::poi::{CreatePoiRequest, UpdatePoiRequest};
use domain::models::Poi;
use persistence::repositories::PoiRepository;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;

#[derive(Debug, Serialize)]
pub struct ListPoisResponse {
    pub pois: Vec<Poi>,
}

/// GET /api/v1/admin/pois
pub async fn list_pois(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ListPoisResponse>, ApiError> {
    let pois = PoiRepository::new(state.pool.clone())
        .list(true)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListPoisResponse { pois }))
}

/// POST /api/v1/admin/pois
pub async fn create_poi(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreatePoiRequest>,
) -> Result<(StatusCode, Json<Poi>), ApiError> {
    request.validate()?;

    let poi: Poi = PoiRepository::new(state.pool.clone())
        .create(request.name.trim(), request.address.trim())
        .await?
        .into();

    info!(poi_id = %poi.id, "POI created");
    Ok((StatusCode::CREATED, Json(poi)))
}

/// Edit or archive a POI. Archiving keeps it on existing rides.
///
/// PATCH /api/v1/admin/pois/:poi_id
pub async fn update_poi(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(poi_id): Path<Uuid>,
    Json(request): Json<UpdatePoiRequest>,
) -> Result<Json<Poi>, ApiError> {
    request.validate()?;

    let poi: Poi = PoiRepository::new(state.pool.clone())
        .update(
            poi_id,
            request.name.as_deref().map(str::trim),
            request.address.as_deref().map(str::trim),
            request.archived,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("POI not found".to_string()))?
        .into();

    info!(poi_id = %poi.id, archived = poi.archived, "POI updated");
    Ok(Json(poi))
}
