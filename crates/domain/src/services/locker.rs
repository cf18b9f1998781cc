//! Locker orchestration: lookup, registration, availability and open/closed
//! status derived from the usage log.
//!
//! Lockers move through a single one-way transition:
//!
//! ```text
//! UNREGISTERED --register--> AVAILABLE
//! ```
//!
//! None of the operations here wrap their reads and writes in a transaction.
//! Registration is check-then-save and `lock`/`unlock` re-read the status
//! after appending, so concurrent calls on the same locker can interleave.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::store::{LockerStores, StoreError};
use crate::models::locker::{EditLockerRequest, NewLocker, RegisterLockerRequest};
use crate::models::locker_usage::latest_usage;
use crate::models::{
    ActionType, Locker, LockerAvailability, LockerCurrentStatus, LockerDetails,
};

/// Errors returned by [`LockerService`].
#[derive(Debug, Error)]
pub enum LockerError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller broke an API contract; not a user error.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl LockerError {
    fn message(&self) -> String {
        match self {
            LockerError::Unauthorized(msg)
            | LockerError::NotFound(msg)
            | LockerError::Conflict(msg)
            | LockerError::Precondition(msg) => msg.clone(),
            LockerError::Store(err) => err.to_string(),
        }
    }

    /// Keeps unauthorized/not-found/conflict and reports anything else as
    /// not-found keeping its message.
    fn or_not_found(self) -> Self {
        match self {
            LockerError::Unauthorized(_) | LockerError::NotFound(_) | LockerError::Conflict(_) => {
                self
            }
            other => LockerError::NotFound(other.message()),
        }
    }

    /// Reports every failure as not-found keeping its message.
    fn into_not_found(self) -> Self {
        LockerError::NotFound(self.message())
    }
}

/// Identifies a locker by exactly one of its keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockerLookup {
    pub locker_id: Option<i64>,
    pub serial_number: Option<String>,
}

impl LockerLookup {
    pub fn by_id(locker_id: i64) -> Self {
        Self {
            locker_id: Some(locker_id),
            serial_number: None,
        }
    }

    pub fn by_serial_number(serial_number: impl Into<String>) -> Self {
        Self {
            locker_id: None,
            serial_number: Some(serial_number.into()),
        }
    }

    fn describe(&self) -> String {
        match (&self.locker_id, &self.serial_number) {
            (Some(id), _) => format!("Locker {} not found", id),
            (None, Some(serial)) => format!("Locker with serial number {} not found", serial),
            (None, None) => "Locker not found".to_string(),
        }
    }
}

/// Related records to load together with a locker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockerRelation {
    Location,
    Instances,
}

#[derive(Debug, Clone)]
pub struct FindLockerOptions {
    /// Fail with not-found instead of returning `None` on a miss.
    pub throw_error: bool,
    pub relations: Vec<LockerRelation>,
}

impl Default for FindLockerOptions {
    fn default() -> Self {
        Self {
            throw_error: true,
            relations: Vec::new(),
        }
    }
}

/// Settings the locker service needs from the application configuration.
#[derive(Debug, Clone)]
pub struct LockerServiceConfig {
    /// Shared secret locker devices present when creating their record.
    pub device_secret: String,
}

/// Locker business logic over the storage ports.
pub struct LockerService {
    config: LockerServiceConfig,
    stores: LockerStores,
}

impl LockerService {
    pub fn new(config: LockerServiceConfig, stores: LockerStores) -> Self {
        Self { config, stores }
    }

    /// Finds a locker by id or serial number.
    ///
    /// Exactly one key must be set; anything else is a precondition error,
    /// whatever `throw_error` says.
    pub async fn find_locker(
        &self,
        lookup: &LockerLookup,
        options: &FindLockerOptions,
    ) -> Result<Option<LockerDetails>, LockerError> {
        let locker = match self.fetch(lookup).await? {
            Some(locker) => locker,
            None if options.throw_error => return Err(LockerError::NotFound(lookup.describe())),
            None => return Ok(None),
        };

        self.load_relations(locker, &options.relations)
            .await
            .map(Some)
    }

    pub async fn find_active_locker_by_id(&self, locker_id: i64) -> Result<Locker, LockerError> {
        self.find_active(&LockerLookup::by_id(locker_id)).await
    }

    pub async fn find_active_locker_by_serial_number(
        &self,
        serial_number: &str,
    ) -> Result<Locker, LockerError> {
        self.find_active(&LockerLookup::by_serial_number(serial_number))
            .await
    }

    /// Every locker with its location.
    pub async fn list_lockers_with_location(&self) -> Result<Vec<LockerDetails>, LockerError> {
        let lockers = self.stores.lockers.find_all().await?;
        let locations: HashMap<i64, _> = self
            .stores
            .locations
            .find_all()
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        Ok(lockers
            .into_iter()
            .map(|locker| {
                let location = locker
                    .location_id
                    .and_then(|id| locations.get(&id).cloned());
                LockerDetails {
                    locker,
                    location,
                    locker_instances: None,
                }
            })
            .collect())
    }

    /// A locker with all of its rental sessions.
    pub async fn find_locker_instance_history(
        &self,
        locker_id: i64,
    ) -> Result<LockerDetails, LockerError> {
        let lookup = LockerLookup::by_id(locker_id);
        let options = FindLockerOptions {
            throw_error: true,
            relations: vec![LockerRelation::Instances],
        };

        self.find_locker(&lookup, &options)
            .await
            .and_then(|found| found.ok_or_else(|| LockerError::NotFound(lookup.describe())))
            .map_err(LockerError::or_not_found)
    }

    /// Creates an unregistered locker for a device presenting the shared secret.
    pub async fn create_locker(&self, secret: &str) -> Result<Locker, LockerError> {
        if secret != self.config.device_secret {
            warn!("Locker creation rejected: wrong device secret");
            return Err(LockerError::Unauthorized("Wrong iot secret".into()));
        }

        let new_locker = NewLocker {
            serial_number: Uuid::new_v4().to_string(),
        };
        let locker = self
            .stores
            .lockers
            .insert(new_locker)
            .await
            .map_err(|e| LockerError::Conflict(e.to_string()))?;

        info!(
            locker_id = locker.id,
            serial_number = %locker.serial_number,
            "Locker created"
        );
        Ok(locker)
    }

    /// Registers an unregistered locker at a location. One-shot.
    pub async fn register_locker(
        &self,
        locker_id: i64,
        request: &RegisterLockerRequest,
    ) -> Result<Locker, LockerError> {
        self.try_register(locker_id, request)
            .await
            .map_err(LockerError::or_not_found)
    }

    async fn try_register(
        &self,
        locker_id: i64,
        request: &RegisterLockerRequest,
    ) -> Result<Locker, LockerError> {
        let mut locker = self.require(&LockerLookup::by_id(locker_id)).await?;
        let location = self
            .stores
            .locations
            .find_by_id(request.location_id)
            .await?
            .ok_or_else(|| {
                LockerError::NotFound(format!("Location {} not found", request.location_id))
            })?;

        if locker.availability != LockerAvailability::Unregistered {
            return Err(LockerError::Conflict(
                "Locker has already been registered".into(),
            ));
        }

        locker.availability = LockerAvailability::Available;
        locker.name = Some(request.name.clone());
        locker.number = Some(request.number);
        locker.location_id = Some(location.id);

        let saved = self.stores.lockers.save(&locker).await?;
        info!(
            locker_id = saved.id,
            location_id = location.id,
            number = request.number,
            "Locker registered"
        );
        Ok(saved)
    }

    pub async fn edit_locker(
        &self,
        locker_id: i64,
        changes: &EditLockerRequest,
    ) -> Result<(), LockerError> {
        debug!(locker_id, "Editing locker");
        Ok(self.stores.lockers.update(locker_id, changes).await?)
    }

    pub async fn delete_locker(&self, locker_id: i64) -> Result<(), LockerError> {
        debug!(locker_id, "Deleting locker");
        Ok(self.stores.lockers.delete(locker_id).await?)
    }

    /// Open/closed status from the most recent usage entry; closed when the
    /// log is empty.
    pub async fn get_current_status(
        &self,
        serial_number: &str,
    ) -> Result<LockerCurrentStatus, LockerError> {
        self.try_current_status(serial_number)
            .await
            .map_err(LockerError::or_not_found)
    }

    async fn try_current_status(
        &self,
        serial_number: &str,
    ) -> Result<LockerCurrentStatus, LockerError> {
        let locker = self
            .require(&LockerLookup::by_serial_number(serial_number))
            .await?;
        let usages = self.stores.usages.find_by_locker_id(locker.id).await?;

        let is_open = latest_usage(&usages)
            .map(|usage| usage.action_type == ActionType::Open)
            .unwrap_or(false);

        Ok(LockerCurrentStatus {
            is_open,
            locker_number: locker.number,
        })
    }

    /// Records a CLOSE against the locker's in-use instance and returns the
    /// re-read status.
    pub async fn lock(&self, serial_number: &str) -> Result<LockerCurrentStatus, LockerError> {
        self.record_action(serial_number, ActionType::Close).await
    }

    /// Records an OPEN against the locker's in-use instance and returns the
    /// re-read status.
    pub async fn unlock(&self, serial_number: &str) -> Result<LockerCurrentStatus, LockerError> {
        self.record_action(serial_number, ActionType::Open).await
    }

    async fn record_action(
        &self,
        serial_number: &str,
        action_type: ActionType,
    ) -> Result<LockerCurrentStatus, LockerError> {
        let recorded = async {
            let locker = self
                .require(&LockerLookup::by_serial_number(serial_number))
                .await?;
            let instance = self
                .stores
                .instances
                .find_in_use_by_locker_id(locker.id)
                .await?
                .ok_or_else(|| {
                    LockerError::NotFound(format!("Locker {} is not in use", locker.id))
                })?;

            self.stores.usages.record(instance.id, action_type).await?;
            info!(
                locker_id = locker.id,
                locker_instance_id = instance.id,
                action = %action_type,
                "Locker usage recorded"
            );
            Ok::<_, LockerError>(())
        };
        recorded.await.map_err(LockerError::or_not_found)?;

        self.get_current_status(serial_number).await
    }

    /// Whether the locker is registered and available. Any failure, whatever
    /// its cause, is reported as not-found.
    pub async fn is_locker_active(&self, locker_id: i64) -> Result<bool, LockerError> {
        self.require(&LockerLookup::by_id(locker_id))
            .await
            .map(|locker| locker.is_available())
            .map_err(LockerError::into_not_found)
    }

    async fn fetch(&self, lookup: &LockerLookup) -> Result<Option<Locker>, LockerError> {
        match (lookup.locker_id, lookup.serial_number.as_deref()) {
            (Some(id), None) => Ok(self.stores.lockers.find_by_id(id).await?),
            (None, Some(serial_number)) => Ok(self
                .stores
                .lockers
                .find_by_serial_number(serial_number)
                .await?),
            _ => Err(LockerError::Precondition(
                "Exactly one of locker id or serial number must be specified".into(),
            )),
        }
    }

    async fn require(&self, lookup: &LockerLookup) -> Result<Locker, LockerError> {
        self.fetch(lookup)
            .await?
            .ok_or_else(|| LockerError::NotFound(lookup.describe()))
    }

    async fn find_active(&self, lookup: &LockerLookup) -> Result<Locker, LockerError> {
        let locker = self.require(lookup).await?;
        if !locker.is_available() {
            return Err(LockerError::NotFound(format!(
                "{} or not available",
                lookup.describe()
            )));
        }
        Ok(locker)
    }

    async fn load_relations(
        &self,
        locker: Locker,
        relations: &[LockerRelation],
    ) -> Result<LockerDetails, LockerError> {
        let mut details = LockerDetails::bare(locker);

        for relation in relations {
            match relation {
                LockerRelation::Location => {
                    if let Some(location_id) = details.locker.location_id {
                        details.location = self.stores.locations.find_by_id(location_id).await?;
                    }
                }
                LockerRelation::Instances => {
                    let instances = self
                        .stores
                        .instances
                        .find_by_locker_id(details.locker.id)
                        .await?;
                    details.locker_instances = Some(instances);
                }
            }
        }

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    const DEVICE_SECRET: &str = "iot-device-secret";

    fn setup() -> (Arc<InMemoryStore>, LockerService) {
        let store = Arc::new(InMemoryStore::new());
        let service = LockerService::new(
            LockerServiceConfig {
                device_secret: DEVICE_SECRET.into(),
            },
            LockerStores::from_shared(store.clone()),
        );
        (store, service)
    }

    fn gym_registration() -> RegisterLockerRequest {
        RegisterLockerRequest {
            location_id: 5,
            name: "Gym".into(),
            number: 12,
        }
    }

    async fn unregistered_locker(service: &LockerService) -> Locker {
        service.create_locker(DEVICE_SECRET).await.unwrap()
    }

    async fn registered_locker(store: &InMemoryStore, service: &LockerService) -> Locker {
        store.seed_location(5, "Sports Center").await;
        let locker = unregistered_locker(service).await;
        service
            .register_locker(locker.id, &gym_registration())
            .await
            .unwrap()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_locker_with_device_secret() {
        let (_, service) = setup();

        let locker = service.create_locker(DEVICE_SECRET).await.unwrap();

        assert_eq!(locker.availability, LockerAvailability::Unregistered);
        assert!(locker.name.is_none());
        assert!(locker.number.is_none());
        assert!(locker.location_id.is_none());
        assert!(!locker.serial_number.is_empty());
    }

    #[tokio::test]
    async fn test_create_locker_wrong_secret() {
        let (_, service) = setup();
        let err = service.create_locker("guess").await.unwrap_err();
        assert!(matches!(err, LockerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_create_locker_store_failure_is_conflict() {
        let (store, service) = setup();
        store
            .set_failure(Some(StoreError::Backend("disk full".into())))
            .await;

        let err = service.create_locker(DEVICE_SECRET).await.unwrap_err();
        assert!(matches!(err, LockerError::Conflict(msg) if msg.contains("disk full")));
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_find_locker_without_key_is_precondition_error() {
        let (_, service) = setup();

        for throw_error in [true, false] {
            let options = FindLockerOptions {
                throw_error,
                relations: Vec::new(),
            };
            let err = service
                .find_locker(&LockerLookup::default(), &options)
                .await
                .unwrap_err();
            assert!(matches!(err, LockerError::Precondition(_)));
        }
    }

    #[tokio::test]
    async fn test_find_locker_with_both_keys_is_precondition_error() {
        let (_, service) = setup();
        let lookup = LockerLookup {
            locker_id: Some(1),
            serial_number: Some("SN001".into()),
        };
        let err = service
            .find_locker(&lookup, &FindLockerOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_find_locker_miss() {
        let (_, service) = setup();

        let err = service
            .find_locker(&LockerLookup::by_id(42), &FindLockerOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::NotFound(_)));

        let options = FindLockerOptions {
            throw_error: false,
            relations: Vec::new(),
        };
        let found = service
            .find_locker(&LockerLookup::by_serial_number("missing"), &options)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_locker_by_serial_with_relations() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        store.seed_instance(locker.id, 7, false).await;
        store.seed_instance(locker.id, 8, true).await;

        let options = FindLockerOptions {
            throw_error: true,
            relations: vec![LockerRelation::Location, LockerRelation::Instances],
        };
        let details = service
            .find_locker(&LockerLookup::by_serial_number(&locker.serial_number), &options)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(details.locker.id, locker.id);
        assert_eq!(details.location.unwrap().name, "Sports Center");
        assert_eq!(details.locker_instances.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_active_locker() {
        let (store, service) = setup();
        let pending = unregistered_locker(&service).await;
        let active = registered_locker(&store, &service).await;

        assert!(matches!(
            service.find_active_locker_by_id(pending.id).await,
            Err(LockerError::NotFound(_))
        ));
        assert!(matches!(
            service
                .find_active_locker_by_serial_number(&pending.serial_number)
                .await,
            Err(LockerError::NotFound(_))
        ));
        assert_eq!(
            service.find_active_locker_by_id(active.id).await.unwrap().id,
            active.id
        );
        assert_eq!(
            service
                .find_active_locker_by_serial_number(&active.serial_number)
                .await
                .unwrap()
                .id,
            active.id
        );
    }

    #[tokio::test]
    async fn test_list_lockers_with_location() {
        let (store, service) = setup();
        let registered = registered_locker(&store, &service).await;
        let pending = unregistered_locker(&service).await;

        let lockers = service.list_lockers_with_location().await.unwrap();
        assert_eq!(lockers.len(), 2);

        let by_id = |id| lockers.iter().find(|d| d.locker.id == id).unwrap();
        assert_eq!(by_id(registered.id).location.as_ref().unwrap().id, 5);
        assert!(by_id(pending.id).location.is_none());
    }

    #[tokio::test]
    async fn test_find_locker_instance_history() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        store.seed_instance(locker.id, 7, false).await;

        let history = service.find_locker_instance_history(locker.id).await.unwrap();
        assert_eq!(history.locker_instances.unwrap()[0].owner_user_id, 7);

        let err = service.find_locker_instance_history(999).await.unwrap_err();
        assert!(matches!(err, LockerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_store_failure_reported_as_not_found() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        store
            .set_failure(Some(StoreError::Backend("connection reset".into())))
            .await;

        let err = service
            .find_locker_instance_history(locker.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::NotFound(msg) if msg.contains("connection reset")));
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_register_locker_once() {
        let (store, service) = setup();
        store.seed_location(5, "Sports Center").await;
        let locker = unregistered_locker(&service).await;

        let registered = service
            .register_locker(locker.id, &gym_registration())
            .await
            .unwrap();

        assert_eq!(registered.availability, LockerAvailability::Available);
        assert_eq!(registered.name.as_deref(), Some("Gym"));
        assert_eq!(registered.number, Some(12));
        assert_eq!(registered.location_id, Some(5));

        let err = service
            .register_locker(locker.id, &gym_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_missing_locker() {
        let (store, service) = setup();
        store.seed_location(5, "Sports Center").await;

        let err = service
            .register_locker(404, &gym_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_register_missing_location() {
        let (_, service) = setup();
        let locker = unregistered_locker(&service).await;

        let err = service
            .register_locker(locker.id, &gym_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::NotFound(msg) if msg.contains("Location 5")));
    }

    #[tokio::test]
    async fn test_register_store_failure_reported_as_not_found() {
        let (store, service) = setup();
        store.seed_location(5, "Sports Center").await;
        let locker = unregistered_locker(&service).await;
        store
            .set_failure(Some(StoreError::Backend("connection reset".into())))
            .await;

        let err = service
            .register_locker(locker.id, &gym_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::NotFound(msg) if msg.contains("connection reset")));
    }

    // ------------------------------------------------------------------
    // Edit / delete
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_edit_locker() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;

        let changes = EditLockerRequest {
            name: Some("Pool".into()),
            ..Default::default()
        };
        service.edit_locker(locker.id, &changes).await.unwrap();

        let details = service
            .find_locker(&LockerLookup::by_id(locker.id), &FindLockerOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.locker.name.as_deref(), Some("Pool"));
        assert_eq!(details.locker.number, Some(12));
        assert_eq!(details.locker.availability, LockerAvailability::Available);
    }

    #[tokio::test]
    async fn test_edit_locker_duplicate_serial_surfaces_store_conflict() {
        let (_, service) = setup();
        let a = unregistered_locker(&service).await;
        let b = unregistered_locker(&service).await;

        let changes = EditLockerRequest {
            serial_number: Some(a.serial_number.clone()),
            ..Default::default()
        };
        let err = service.edit_locker(b.id, &changes).await.unwrap_err();
        assert!(matches!(err, LockerError::Store(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_locker() {
        let (_, service) = setup();
        let locker = unregistered_locker(&service).await;

        service.delete_locker(locker.id).await.unwrap();

        let options = FindLockerOptions {
            throw_error: false,
            relations: Vec::new(),
        };
        assert!(service
            .find_locker(&LockerLookup::by_id(locker.id), &options)
            .await
            .unwrap()
            .is_none());
    }

    // ------------------------------------------------------------------
    // Status and usage
    // ------------------------------------------------------------------

    fn t(offset_secs: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap() + Duration::seconds(offset_secs)
    }

    #[tokio::test]
    async fn test_status_closed_when_log_empty() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;

        let status = service
            .get_current_status(&locker.serial_number)
            .await
            .unwrap();
        assert!(!status.is_open);
        assert_eq!(status.locker_number, Some(12));
    }

    #[tokio::test]
    async fn test_status_follows_latest_entry() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        let instance = store.seed_instance(locker.id, 7, true).await;

        store.seed_usage(instance.id, ActionType::Open, t(0)).await;
        assert!(
            service
                .get_current_status(&locker.serial_number)
                .await
                .unwrap()
                .is_open
        );

        store.seed_usage(instance.id, ActionType::Close, t(60)).await;
        assert!(
            !service
                .get_current_status(&locker.serial_number)
                .await
                .unwrap()
                .is_open
        );
    }

    #[tokio::test]
    async fn test_status_uses_creation_time_not_insertion_order() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        let instance = store.seed_instance(locker.id, 7, true).await;

        store.seed_usage(instance.id, ActionType::Close, t(60)).await;
        store.seed_usage(instance.id, ActionType::Open, t(0)).await;

        let status = service
            .get_current_status(&locker.serial_number)
            .await
            .unwrap();
        assert!(!status.is_open);
    }

    #[tokio::test]
    async fn test_status_unknown_serial() {
        let (_, service) = setup();
        let err = service.get_current_status("SN404").await.unwrap_err();
        assert!(matches!(err, LockerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_status_store_failure_reported_as_not_found() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        store
            .set_failure(Some(StoreError::Backend("timeout".into())))
            .await;

        let err = service
            .get_current_status(&locker.serial_number)
            .await
            .unwrap_err();
        assert!(matches!(err, LockerError::NotFound(msg) if msg.contains("timeout")));
    }

    #[tokio::test]
    async fn test_lock_and_unlock_in_use_locker() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        store.seed_instance(locker.id, 7, true).await;

        let status = service.unlock(&locker.serial_number).await.unwrap();
        assert!(status.is_open);
        assert_eq!(status.locker_number, Some(12));

        let status = service.lock(&locker.serial_number).await.unwrap();
        assert!(!status.is_open);
    }

    #[tokio::test]
    async fn test_lock_without_in_use_instance() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        store.seed_instance(locker.id, 7, false).await;

        let err = service.lock(&locker.serial_number).await.unwrap_err();
        assert!(matches!(err, LockerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lock_unknown_serial() {
        let (_, service) = setup();
        let err = service.lock("SN404").await.unwrap_err();
        assert!(matches!(err, LockerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lock_and_unlock_store_failure_reported_as_not_found() {
        let (store, service) = setup();
        let locker = registered_locker(&store, &service).await;
        store.seed_instance(locker.id, 7, true).await;
        store
            .set_failure(Some(StoreError::Backend("deadlock detected".into())))
            .await;

        let err = service.lock(&locker.serial_number).await.unwrap_err();
        assert!(matches!(err, LockerError::NotFound(msg) if msg.contains("deadlock detected")));

        let err = service.unlock(&locker.serial_number).await.unwrap_err();
        assert!(matches!(err, LockerError::NotFound(msg) if msg.contains("deadlock detected")));
    }

    // ------------------------------------------------------------------
    // Activity
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_is_locker_active() {
        let (store, service) = setup();
        let pending = unregistered_locker(&service).await;
        let active = registered_locker(&store, &service).await;

        assert!(!service.is_locker_active(pending.id).await.unwrap());
        assert!(service.is_locker_active(active.id).await.unwrap());
        assert!(matches!(
            service.is_locker_active(999).await,
            Err(LockerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_is_locker_active_coarsens_every_failure() {
        let (store, service) = setup();
        let locker = unregistered_locker(&service).await;
        store
            .set_failure(Some(StoreError::Conflict("unexpected".into())))
            .await;

        let err = service.is_locker_active(locker.id).await.unwrap_err();
        assert!(matches!(err, LockerError::NotFound(msg) if msg.contains("unexpected")));
    }
}
