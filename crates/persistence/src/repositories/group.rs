//! Group and membership repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupEntity, GroupMemberEntity, GroupMemberWithUserEntity};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create(&self, name: &str) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_group");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            INSERT INTO groups (name)
            VALUES ($1)
            RETURNING id, name, archived, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(
            "SELECT id, name, archived, created_at, updated_at FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All groups, newest first.
    pub async fn list_all(&self) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, archived, created_at, updated_at
            FROM groups
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Non-archived groups the user belongs to, by name.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups_for_user");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT g.id, g.name, g.archived, g.created_at, g.updated_at
            FROM groups g
            JOIN group_members gm ON gm.group_id = g.id
            WHERE gm.user_id = $1 AND g.archived = FALSE
            ORDER BY g.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        archived: Option<bool>,
    ) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_group");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            UPDATE groups
            SET name = COALESCE($2, name),
                archived = COALESCE($3, archived),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, archived, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(archived)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Adds a member. A repeated add fails with 23505 on `group_members_unique`.
    pub async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupMemberEntity, sqlx::Error> {
        let timer = QueryTimer::new("add_group_member");
        let result = sqlx::query_as::<_, GroupMemberEntity>(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES ($1, $2)
            RETURNING id, group_id, user_id, created_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_group_member");
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    pub async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_group_member");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Members with their user rows, ordered by name.
    pub async fn list_members(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<GroupMemberWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_members");
        let result = sqlx::query_as::<_, GroupMemberWithUserEntity>(
            r#"
            SELECT u.id AS user_id, u.name, u.email, u.phone, gm.created_at AS joined_at
            FROM group_members gm
            JOIN users u ON u.id = gm.user_id
            WHERE gm.group_id = $1
            ORDER BY u.name ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
