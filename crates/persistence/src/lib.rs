//! Persistence layer for the locker rental backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain storage ports

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

pub use repositories::postgres_stores;
