//! Persistence layer for the carpool backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the PostgreSQL `RideStore`
//! - Query timing metrics
//!
//! Migrations live in `src/migrations` and are embedded by the API binary.

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
