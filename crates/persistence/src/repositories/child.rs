//! Child repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ChildEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct ChildRepository {
    pool: PgPool,
}

impl ChildRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        parent_id: Uuid,
        name: &str,
        phone: Option<&str>,
    ) -> Result<ChildEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_child");
        let result = sqlx::query_as::<_, ChildEntity>(
            r#"
            INSERT INTO children (parent_id, name, phone)
            VALUES ($1, $2, $3)
            RETURNING id, parent_id, name, phone, created_at
            "#,
        )
        .bind(parent_id)
        .bind(name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ChildEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_child_by_id");
        let result = sqlx::query_as::<_, ChildEntity>(
            "SELECT id, parent_id, name, phone, created_at FROM children WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A parent's children ordered by name.
    pub async fn list_for_parent(&self, parent_id: Uuid) -> Result<Vec<ChildEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_children_for_parent");
        let result = sqlx::query_as::<_, ChildEntity>(
            r#"
            SELECT id, parent_id, name, phone, created_at
            FROM children
            WHERE parent_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether the child is the passenger of an open or accepted ride.
    pub async fn has_live_rides(&self, child_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("child_has_live_rides");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM ride_requests
                WHERE passenger_type = 'child' AND passenger_id = $1
                  AND status IN ('open', 'accepted')
            )
            "#,
        )
        .bind(child_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a child owned by `parent_id`. Returns false if nothing matched.
    pub async fn delete_for_parent(&self, id: Uuid, parent_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_child");
        let result = sqlx::query("DELETE FROM children WHERE id = $1 AND parent_id = $2")
            .bind(id)
            .bind(parent_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }
}
