//! Admin bootstrap service for initial setup.
//!
//! Creates the first admin user on startup if configured. Idempotent: an
//! existing account with the bootstrap email is left untouched.

use persistence::repositories::{NewUser, UserRepository};
use shared::password::{check_password_strength, hash_password, PasswordError};
use shared::validation::normalize_email;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

pub const BOOTSTRAP_ADMIN_NAME: &str = "Administrator";

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// What [`bootstrap_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyExists,
    Created,
}

/// Bootstrap admin user if configured and not already done.
///
/// Call after migrations on startup.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if config.bootstrap_email.trim().is_empty() {
        return Ok(BootstrapOutcome::NotConfigured);
    }

    if config.bootstrap_password.is_empty() {
        warn!(
            "CARPOOL__ADMIN__BOOTSTRAP_EMAIL is set but CARPOOL__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap"
        );
        return Ok(BootstrapOutcome::NotConfigured);
    }

    let users = UserRepository::new(pool.clone());
    let email = normalize_email(&config.bootstrap_email);

    if users.find_by_email(&email).await?.is_some() {
        info!("Bootstrap admin email already registered - skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    if let Err(reason) = check_password_strength(&config.bootstrap_password) {
        warn!(reason, "Bootstrap admin password is weak");
    }

    let password_hash = hash_password(&config.bootstrap_password)?;
    let admin = users
        .create_user(NewUser {
            email: &email,
            password_hash: &password_hash,
            name: BOOTSTRAP_ADMIN_NAME,
            phone: "",
            home_address: "",
            is_approved: true,
            is_admin: true,
        })
        .await?;

    info!(
        email = %email,
        user_id = %admin.id,
        "Bootstrap admin user created successfully"
    );

    warn!(
        "SECURITY: Remove CARPOOL__ADMIN__BOOTSTRAP_EMAIL and CARPOOL__ADMIN__BOOTSTRAP_PASSWORD \
         from configuration after initial setup"
    );

    Ok(BootstrapOutcome::Created)
}
