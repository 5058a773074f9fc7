//! Application services that sit between routes and repositories.

pub mod admin_bootstrap;
pub mod auth;

pub use admin_bootstrap::{bootstrap_admin, BootstrapError, BootstrapOutcome};
pub use auth::{AuthError, AuthService, Signup, TokenPair, VerifiedAccess};
