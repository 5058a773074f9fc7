//! Domain layer for the carpool backend.
//!
//! This crate contains:
//! - Domain models (User, Child, Poi, Group, RideRequest) and their DTOs
//! - The ride request lifecycle, contact visibility and feed rules
//! - The `RideStore` contract the persistence layer implements

pub mod models;
pub mod services;
