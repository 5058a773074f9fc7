//! Carpool group domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A set of users who share ride requests with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,
}

/// Request payload for renaming or archiving a group.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

/// A group member as shown to fellow members. Contact details are withheld.
#[derive(Debug, Clone, Serialize)]
pub struct MemberDirectoryEntry {
    pub user_id: Uuid,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

/// A group member as shown to admins.
#[derive(Debug, Clone, Serialize)]
pub struct AdminMemberResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_group_validation() {
        assert!(CreateGroupRequest {
            name: "Oak Street".to_string()
        }
        .validate()
        .is_ok());
        assert!(CreateGroupRequest {
            name: String::new()
        }
        .validate()
        .is_err());
        assert!(CreateGroupRequest {
            name: "x".repeat(101)
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_update_group_archive_only() {
        let req = UpdateGroupRequest {
            name: None,
            archived: Some(true),
        };
        assert!(req.validate().is_ok());
    }
}
