//! Custom Axum extractors.

pub mod admin_user;
pub mod user_auth;

pub use admin_user::AdminUser;
pub use user_auth::UserAuth;
