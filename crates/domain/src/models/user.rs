//! User account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A member of the carpool community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub home_address: String,
    pub is_approved: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored token pair; deleting it ends the session.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// Request payload for editing one's own profile.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    #[validate(
        length(min = 1, max = 300, message = "Home address must be 1-300 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub home_address: Option<String>,
}

/// The caller's own profile, contact details included.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub home_address: String,
    pub is_approved: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            home_address: user.home_address,
            is_approved: user.is_approved,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Query parameters for the admin user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Only users awaiting approval.
    #[serde(default)]
    pub pending: bool,
}

/// A user as listed to admins.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub is_approved: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AdminUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            is_approved: user.is_approved,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}
