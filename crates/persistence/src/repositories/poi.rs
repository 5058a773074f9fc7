//! Point of interest repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PoiEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PoiRepository {
    pool: PgPool,
}

impl PoiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, address: &str) -> Result<PoiEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_poi");
        let result = sqlx::query_as::<_, PoiEntity>(
            r#"
            INSERT INTO pois (name, address)
            VALUES ($1, $2)
            RETURNING id, name, address, archived, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(address)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PoiEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_poi_by_id");
        let result = sqlx::query_as::<_, PoiEntity>(
            "SELECT id, name, address, archived, created_at, updated_at FROM pois WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// POIs ordered by name; archived ones only when asked for.
    pub async fn list(&self, include_archived: bool) -> Result<Vec<PoiEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pois");
        let result = sqlx::query_as::<_, PoiEntity>(
            r#"
            SELECT id, name, address, archived, created_at, updated_at
            FROM pois
            WHERE ($1 = TRUE OR archived = FALSE)
            ORDER BY name ASC
            "#,
        )
        .bind(include_archived)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        address: Option<&str>,
        archived: Option<bool>,
    ) -> Result<Option<PoiEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_poi");
        let result = sqlx::query_as::<_, PoiEntity>(
            r#"
            UPDATE pois
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                archived = COALESCE($4, archived),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, address, archived, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(archived)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
