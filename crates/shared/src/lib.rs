//! Shared utilities for the carpool backend.
//!
//! Used by every other crate in the workspace:
//! - SHA-256 helpers for storing token identifiers
//! - JWT issue and verification (RS256)
//! - Password hashing with Argon2id
//! - Reusable `validator` functions

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
