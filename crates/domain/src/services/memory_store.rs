//! In-memory implementation of the storage ports.
//!
//! Enforces the same constraints as the PostgreSQL schema (unique serial
//! numbers, location foreign key, cascading deletes) so services behave the
//! same against it. Used by unit and HTTP tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{
    LocationStore, LockerInstanceStore, LockerStore, LockerUsageStore, StoreError, StoreResult,
};
use crate::models::locker::{EditLockerRequest, NewLocker};
use crate::models::{
    ActionType, Location, Locker, LockerAvailability, LockerInstance, LockerUsage,
};

#[derive(Default)]
struct Tables {
    lockers: BTreeMap<i64, Locker>,
    locations: BTreeMap<i64, Location>,
    instances: BTreeMap<i64, LockerInstance>,
    usages: BTreeMap<i64, LockerUsage>,
    next_id: i64,
    /// When set, every port call fails with this error.
    failure: Option<StoreError>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self) -> StoreResult<()> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn ensure_unique_serial(&self, serial_number: &str, except_id: Option<i64>) -> StoreResult<()> {
        let taken = self
            .lockers
            .values()
            .any(|l| l.serial_number == serial_number && Some(l.id) != except_id);
        if taken {
            return Err(StoreError::Conflict(format!(
                "serial number {} already exists",
                serial_number
            )));
        }
        Ok(())
    }

    fn ensure_location(&self, location_id: Option<i64>) -> StoreResult<()> {
        match location_id {
            Some(id) if !self.locations.contains_key(&id) => Err(StoreError::MissingReference(
                format!("location {} does not exist", id),
            )),
            _ => Ok(()),
        }
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `failure`, or restores normal
    /// operation with `None`.
    pub async fn set_failure(&self, failure: Option<StoreError>) {
        self.tables.write().await.failure = failure;
    }

    /// Inserts a location with a chosen id.
    pub async fn seed_location(&self, id: i64, name: &str) -> Location {
        let now = Utc::now();
        let location = Location {
            id,
            name: name.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        tables.next_id = tables.next_id.max(id);
        tables.locations.insert(id, location.clone());
        location
    }

    /// Opens a rental session on a locker.
    pub async fn seed_instance(
        &self,
        locker_id: i64,
        owner_user_id: i64,
        in_use: bool,
    ) -> LockerInstance {
        let mut tables = self.tables.write().await;
        let instance = LockerInstance {
            id: tables.next_id(),
            locker_id,
            owner_user_id,
            in_use,
            start_time: Utc::now(),
            end_time: None,
        };
        tables.instances.insert(instance.id, instance.clone());
        instance
    }

    /// Appends a usage entry with an explicit timestamp.
    pub async fn seed_usage(
        &self,
        locker_instance_id: i64,
        action_type: ActionType,
        created_at: DateTime<Utc>,
    ) -> LockerUsage {
        let mut tables = self.tables.write().await;
        let usage = LockerUsage {
            id: tables.next_id(),
            locker_instance_id,
            action_type,
            created_at,
        };
        tables.usages.insert(usage.id, usage.clone());
        usage
    }
}

#[async_trait]
impl LockerStore for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Locker>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables.lockers.get(&id).cloned())
    }

    async fn find_by_serial_number(&self, serial_number: &str) -> StoreResult<Option<Locker>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables
            .lockers
            .values()
            .find(|l| l.serial_number == serial_number)
            .cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Locker>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables.lockers.values().cloned().collect())
    }

    async fn insert(&self, locker: NewLocker) -> StoreResult<Locker> {
        let mut tables = self.tables.write().await;
        tables.check()?;
        tables.ensure_unique_serial(&locker.serial_number, None)?;

        let now = Utc::now();
        let locker = Locker {
            id: tables.next_id(),
            serial_number: locker.serial_number,
            name: None,
            number: None,
            availability: LockerAvailability::Unregistered,
            location_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.lockers.insert(locker.id, locker.clone());
        Ok(locker)
    }

    async fn save(&self, locker: &Locker) -> StoreResult<Locker> {
        let mut tables = self.tables.write().await;
        tables.check()?;
        if !tables.lockers.contains_key(&locker.id) {
            return Err(StoreError::Backend(format!(
                "locker {} no longer exists",
                locker.id
            )));
        }
        tables.ensure_unique_serial(&locker.serial_number, Some(locker.id))?;
        tables.ensure_location(locker.location_id)?;

        let mut saved = locker.clone();
        saved.updated_at = Utc::now();
        tables.lockers.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, id: i64, changes: &EditLockerRequest) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check()?;
        if let Some(serial_number) = &changes.serial_number {
            tables.ensure_unique_serial(serial_number, Some(id))?;
        }
        tables.ensure_location(changes.location_id)?;

        if let Some(locker) = tables.lockers.get_mut(&id) {
            if let Some(name) = &changes.name {
                locker.name = Some(name.clone());
            }
            if let Some(number) = changes.number {
                locker.number = Some(number);
            }
            if let Some(location_id) = changes.location_id {
                locker.location_id = Some(location_id);
            }
            if let Some(serial_number) = &changes.serial_number {
                locker.serial_number = serial_number.clone();
            }
            locker.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check()?;
        if tables.lockers.remove(&id).is_some() {
            let instance_ids: Vec<i64> = tables
                .instances
                .values()
                .filter(|i| i.locker_id == id)
                .map(|i| i.id)
                .collect();
            tables
                .usages
                .retain(|_, u| !instance_ids.contains(&u.locker_instance_id));
            tables.instances.retain(|_, i| i.locker_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl LocationStore for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Location>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables.locations.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Location>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables.locations.values().cloned().collect())
    }
}

#[async_trait]
impl LockerUsageStore for InMemoryStore {
    async fn find_by_locker_id(&self, locker_id: i64) -> StoreResult<Vec<LockerUsage>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables
            .usages
            .values()
            .filter(|u| {
                tables
                    .instances
                    .get(&u.locker_instance_id)
                    .is_some_and(|i| i.locker_id == locker_id)
            })
            .cloned()
            .collect())
    }

    async fn record(
        &self,
        locker_instance_id: i64,
        action_type: ActionType,
    ) -> StoreResult<LockerUsage> {
        let mut tables = self.tables.write().await;
        tables.check()?;
        if !tables.instances.contains_key(&locker_instance_id) {
            return Err(StoreError::MissingReference(format!(
                "locker instance {} does not exist",
                locker_instance_id
            )));
        }
        let usage = LockerUsage {
            id: tables.next_id(),
            locker_instance_id,
            action_type,
            created_at: Utc::now(),
        };
        tables.usages.insert(usage.id, usage.clone());
        Ok(usage)
    }
}

#[async_trait]
impl LockerInstanceStore for InMemoryStore {
    async fn find_in_use_by_locker_id(&self, locker_id: i64) -> StoreResult<Option<LockerInstance>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables
            .instances
            .values()
            .filter(|i| i.locker_id == locker_id && i.in_use)
            .max_by_key(|i| i.start_time)
            .cloned())
    }

    async fn find_by_locker_id(&self, locker_id: i64) -> StoreResult<Vec<LockerInstance>> {
        let tables = self.tables.read().await;
        tables.check()?;
        Ok(tables
            .instances
            .values()
            .filter(|i| i.locker_id == locker_id)
            .cloned()
            .collect())
    }
}
