//! Locker entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::LockerAvailability;
use sqlx::FromRow;

/// Database enum for locker availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "locker_availability", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockerAvailabilityDb {
    Unregistered,
    Available,
}

impl From<LockerAvailabilityDb> for LockerAvailability {
    fn from(value: LockerAvailabilityDb) -> Self {
        match value {
            LockerAvailabilityDb::Unregistered => LockerAvailability::Unregistered,
            LockerAvailabilityDb::Available => LockerAvailability::Available,
        }
    }
}

impl From<LockerAvailability> for LockerAvailabilityDb {
    fn from(value: LockerAvailability) -> Self {
        match value {
            LockerAvailability::Unregistered => LockerAvailabilityDb::Unregistered,
            LockerAvailability::Available => LockerAvailabilityDb::Available,
        }
    }
}

/// Database row mapping for the lockers table.
#[derive(Debug, Clone, FromRow)]
pub struct LockerEntity {
    pub id: i64,
    pub serial_number: String,
    pub name: Option<String>,
    pub number: Option<i32>,
    pub availability: LockerAvailabilityDb,
    pub location_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LockerEntity> for domain::models::Locker {
    fn from(entity: LockerEntity) -> Self {
        Self {
            id: entity.id,
            serial_number: entity.serial_number,
            name: entity.name,
            number: entity.number,
            availability: entity.availability.into(),
            location_id: entity.location_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
