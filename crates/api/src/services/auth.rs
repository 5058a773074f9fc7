//! Authentication service for signup, login, and token management.

use chrono::Utc;
use domain::models::User;
use persistence::repositories::{NewUser, UserRepository};
use serde::Serialize;
use shared::crypto::session_token_hash;
use shared::jwt::{IssuedToken, JwtConfig, JwtError};
use shared::password::{check_password_strength, hash_password, verify_password, PasswordError};
use shared::validation::normalize_email;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is pending approval")]
    PendingApproval,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Profile fields collected at signup.
#[derive(Debug, Clone, Copy)]
pub struct Signup<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
    pub home_address: &'a str,
}

/// Token pair returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Identity proven by a valid access token with a live session.
#[derive(Debug, Clone)]
pub struct VerifiedAccess {
    pub user_id: Uuid,
    pub jti: String,
}

struct IssuedPair {
    access: IssuedToken,
    refresh: IssuedToken,
}

impl IssuedPair {
    fn issue(jwt: &JwtConfig, user_id: Uuid) -> Result<Self, JwtError> {
        Ok(Self {
            access: jwt.generate_access_token(user_id)?,
            refresh: jwt.generate_refresh_token(user_id)?,
        })
    }

    fn into_response(self, expires_in: i64) -> TokenPair {
        TokenPair {
            access_token: self.access.token,
            refresh_token: self.refresh.token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Creates an unapproved account. No tokens are issued until an admin
    /// approves it.
    pub async fn signup(&self, signup: Signup<'_>) -> Result<User, AuthError> {
        check_password_strength(signup.password)
            .map_err(|msg| AuthError::WeakPassword(msg.to_string()))?;

        let email = normalize_email(signup.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(signup.password)?;
        let created = self
            .users
            .create_user(NewUser {
                email: &email,
                password_hash: &password_hash,
                name: signup.name.trim(),
                phone: signup.phone.trim(),
                home_address: signup.home_address.trim(),
                is_approved: false,
                is_admin: false,
            })
            .await;

        // Concurrent signups with the same email race past the lookup above.
        let user: User = match created {
            Ok(entity) => entity.into(),
            Err(e) if is_unique_violation(&e) => return Err(AuthError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "User signed up, awaiting approval");
        Ok(user)
    }

    /// Login with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair), AuthError> {
        let user: User = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_approved {
            return Err(AuthError::PendingApproval);
        }

        let tokens = self.start_session(user.id).await?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, tokens))
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The old refresh token and its access token stop working.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(Self::refresh_error)?;
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let old_refresh_hash = session_token_hash(&claims.jti);
        let session = self
            .users
            .find_session_by_refresh_token(&old_refresh_hash, user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.expires_at < Utc::now() {
            self.users.delete_session(session.id).await?;
            return Err(AuthError::InvalidRefreshToken);
        }

        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_approved => {}
            _ => return Err(AuthError::InvalidRefreshToken),
        }

        let pair = IssuedPair::issue(&self.jwt, user_id)?;
        let rotated = self
            .users
            .rotate_session(
                session.id,
                &old_refresh_hash,
                &session_token_hash(&pair.access.jti),
                &session_token_hash(&pair.refresh.jti),
                pair.refresh.expires_at,
            )
            .await?;

        // Lost a race with another refresh of the same token.
        if !rotated {
            return Err(AuthError::SessionNotFound);
        }

        debug!(user_id = %user_id, session_id = %session.id, "Session rotated");
        Ok(pair.into_response(self.jwt.access_token_expiry_secs))
    }

    /// Ends the session of `refresh_token`, or every session of its user
    /// when `all_devices` is set.
    pub async fn logout(&self, refresh_token: &str, all_devices: bool) -> Result<(), AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(Self::refresh_error)?;
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if all_devices {
            let removed = self.users.delete_all_sessions(user_id).await?;
            info!(user_id = %user_id, sessions = removed, "Logged out of all devices");
            return Ok(());
        }

        let session = self
            .users
            .find_session_by_refresh_token(&session_token_hash(&claims.jti), user_id)
            .await?;
        match session {
            Some(session) => {
                self.users.delete_session(session.id).await?;
                info!(user_id = %user_id, "Logged out");
            }
            None => {
                debug!(user_id = %user_id, "Session not found during logout, may already be logged out");
            }
        }
        Ok(())
    }

    /// Validates an access token and checks its session is still live.
    pub async fn verify_access(&self, access_token: &str) -> Result<VerifiedAccess, AuthError> {
        let claims = self
            .jwt
            .validate_access_token(access_token)
            .map_err(|_| AuthError::InvalidCredentials)?;
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidCredentials)?;

        let session = self
            .users
            .find_session_by_token(&session_token_hash(&claims.jti))
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.user_id != user_id || session.expires_at < Utc::now() {
            return Err(AuthError::SessionNotFound);
        }

        Ok(VerifiedAccess {
            user_id,
            jti: claims.jti,
        })
    }

    async fn start_session(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let pair = IssuedPair::issue(&self.jwt, user_id)?;
        self.users
            .create_session(
                user_id,
                &session_token_hash(&pair.access.jti),
                &session_token_hash(&pair.refresh.jti),
                pair.refresh.expires_at,
            )
            .await?;
        Ok(pair.into_response(self.jwt.access_token_expiry_secs))
    }

    fn refresh_error(err: JwtError) -> AuthError {
        match err {
            JwtError::TokenExpired | JwtError::InvalidToken | JwtError::DecodingError(_) => {
                AuthError::InvalidRefreshToken
            }
            other => AuthError::TokenError(other),
        }
    }
}
