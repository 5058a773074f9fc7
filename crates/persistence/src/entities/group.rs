//! Group and membership entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::group::{AdminMemberResponse, MemberDirectoryEntry};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            archived: entity.archived,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the group_members table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMemberEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<GroupMemberEntity> for domain::models::GroupMember {
    fn from(entity: GroupMemberEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            created_at: entity.created_at,
        }
    }
}

/// Membership joined with the member's user row.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMemberWithUserEntity {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
}

impl GroupMemberWithUserEntity {
    /// Projection for fellow members: name only.
    pub fn into_directory_entry(self) -> MemberDirectoryEntry {
        MemberDirectoryEntry {
            user_id: self.user_id,
            name: self.name,
            joined_at: self.joined_at,
        }
    }

    pub fn into_admin_response(self) -> AdminMemberResponse {
        AdminMemberResponse {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            joined_at: self.joined_at,
        }
    }
}
