//! Point of interest domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A fixed destination such as a school or a sports hall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    /// Archived POIs stay on existing rides but cannot be picked for new ones.
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePoiRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(
        length(min = 1, max = 300, message = "Address must be 1-300 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePoiRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 300, message = "Address must be 1-300 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub address: Option<String>,

    pub archived: Option<bool>,
}
