//! Storage ports used by the locker service.
//!
//! The PostgreSQL repositories in the `persistence` crate implement these
//! traits for production; [`super::InMemoryStore`] implements them for tests.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::locker::{EditLockerRequest, NewLocker};
use crate::models::{ActionType, Location, Locker, LockerInstance, LockerUsage};

/// Error raised by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Referenced record not found: {0}")]
    MissingReference(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD over locker records.
#[async_trait]
pub trait LockerStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Locker>>;

    async fn find_by_serial_number(&self, serial_number: &str) -> StoreResult<Option<Locker>>;

    async fn find_all(&self) -> StoreResult<Vec<Locker>>;

    async fn insert(&self, locker: NewLocker) -> StoreResult<Locker>;

    /// Writes every mutable field of `locker` and returns the stored row.
    async fn save(&self, locker: &Locker) -> StoreResult<Locker>;

    /// Applies the set fields of `changes`. Updating a missing id is a no-op.
    async fn update(&self, id: i64, changes: &EditLockerRequest) -> StoreResult<()>;

    /// Deleting a missing id is a no-op.
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

/// Read access to locations.
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Location>>;

    async fn find_all(&self) -> StoreResult<Vec<Location>>;
}

/// Append-only usage log.
#[async_trait]
pub trait LockerUsageStore: Send + Sync {
    /// All usage entries of every instance of the locker, in any order.
    async fn find_by_locker_id(&self, locker_id: i64) -> StoreResult<Vec<LockerUsage>>;

    async fn record(&self, locker_instance_id: i64, action_type: ActionType)
        -> StoreResult<LockerUsage>;
}

/// Read access to rental sessions.
#[async_trait]
pub trait LockerInstanceStore: Send + Sync {
    async fn find_in_use_by_locker_id(&self, locker_id: i64) -> StoreResult<Option<LockerInstance>>;

    async fn find_by_locker_id(&self, locker_id: i64) -> StoreResult<Vec<LockerInstance>>;
}

/// The set of stores a [`super::LockerService`] works against.
#[derive(Clone)]
pub struct LockerStores {
    pub lockers: Arc<dyn LockerStore>,
    pub locations: Arc<dyn LocationStore>,
    pub usages: Arc<dyn LockerUsageStore>,
    pub instances: Arc<dyn LockerInstanceStore>,
}

impl LockerStores {
    /// Uses one backend for every port.
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: LockerStore + LocationStore + LockerUsageStore + LockerInstanceStore + 'static,
    {
        Self {
            lockers: store.clone(),
            locations: store.clone(),
            usages: store.clone(),
            instances: store,
        }
    }
}
