//! Child entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ChildEntity {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ChildEntity> for domain::models::Child {
    fn from(entity: ChildEntity) -> Self {
        Self {
            id: entity.id,
            parent_id: entity.parent_id,
            name: entity.name,
            phone: entity.phone,
            created_at: entity.created_at,
        }
    }
}
