//! HTTP route handlers.

pub mod admin_groups;
pub mod admin_pois;
pub mod admin_users;
pub mod auth;
pub mod groups;
pub mod health;
pub mod me;
pub mod rides;
