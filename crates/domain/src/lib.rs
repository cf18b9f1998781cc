//! Domain layer for the locker rental backend.
//!
//! This crate contains:
//! - Domain models (Locker, Location, LockerInstance, LockerUsage, OAuth state)
//! - Storage ports and an in-memory implementation of them
//! - The locker orchestration service and its error taxonomy

pub mod models;
pub mod services;
