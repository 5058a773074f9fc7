//! Point of interest entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PoiEntity {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PoiEntity> for domain::models::Poi {
    fn from(entity: PoiEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            address: entity.address,
            archived: entity.archived,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
