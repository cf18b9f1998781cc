//! Repository implementations.
//!
//! Repositories implement the domain storage ports on top of PostgreSQL.

pub mod location;
pub mod locker;
pub mod locker_instance;
pub mod locker_usage;

use std::sync::Arc;

use domain::services::{LockerStores, StoreError};
use sqlx::PgPool;
use tracing::warn;

pub use location::LocationRepository;
pub use locker::LockerRepository;
pub use locker_instance::LockerInstanceRepository;
pub use locker_usage::LockerUsageRepository;

/// Builds the PostgreSQL-backed store set for the locker service.
pub fn postgres_stores(pool: PgPool) -> LockerStores {
    LockerStores {
        lockers: Arc::new(LockerRepository::new(pool.clone())),
        locations: Arc::new(LocationRepository::new(pool.clone())),
        usages: Arc::new(LockerUsageRepository::new(pool.clone())),
        instances: Arc::new(LockerInstanceRepository::new(pool)),
    }
}

/// Maps a driver error onto the storage error taxonomy.
///
/// Unique violations (23505) become conflicts, foreign key violations
/// (23503) missing references. Anything else is logged and reported as a
/// backend failure.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Conflict(db_err.message().to_string()),
            Some("23503") => StoreError::MissingReference(db_err.message().to_string()),
            code => {
                warn!(code = ?code, error = %db_err, "Database error");
                StoreError::Backend(format!("Database error: {}", db_err))
            }
        },
        other => {
            warn!(error = %other, "Database error");
            StoreError::Backend(format!("Database error: {}", other))
        }
    }
}
