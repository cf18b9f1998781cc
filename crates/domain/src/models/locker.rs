//! Locker domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Location, LockerInstance};

/// Registration state of a locker.
///
/// Lockers are created `Unregistered` by the device and become `Available`
/// once an administrator registers them at a location. The transition is
/// one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockerAvailability {
    Unregistered,
    Available,
}

impl std::fmt::Display for LockerAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockerAvailability::Unregistered => write!(f, "UNREGISTERED"),
            LockerAvailability::Available => write!(f, "AVAILABLE"),
        }
    }
}

/// A physical locker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locker {
    pub id: i64,
    pub serial_number: String,
    pub name: Option<String>,
    pub number: Option<i32>,
    pub availability: LockerAvailability,
    #[serde(rename = "locationID")]
    pub location_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Locker {
    pub fn is_available(&self) -> bool {
        self.availability == LockerAvailability::Available
    }
}

/// Values for a locker about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocker {
    pub serial_number: String,
}

/// A locker together with the relations a caller asked to load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerDetails {
    #[serde(flatten)]
    pub locker: Locker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locker_instances: Option<Vec<LockerInstance>>,
}

impl LockerDetails {
    pub fn bare(locker: Locker) -> Self {
        Self {
            locker,
            location: None,
            locker_instances: None,
        }
    }
}

/// Request sent by a locker device to create its record.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLockerRequest {
    #[validate(length(min = 1, message = "secret is required"))]
    pub secret: String,
}

/// Request to register an unregistered locker at a location.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLockerRequest {
    #[serde(rename = "locationID")]
    pub location_id: i64,
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "number must not be negative"))]
    pub number: i32,
}

/// Partial update of a locker's descriptive fields.
///
/// Availability is deliberately absent: it only moves through registration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditLockerRequest {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "number must not be negative"))]
    pub number: Option<i32>,
    #[serde(rename = "locationID")]
    pub location_id: Option<i64>,
    #[validate(length(min = 1, message = "serialNumber must not be empty"))]
    pub serial_number: Option<String>,
}

impl EditLockerRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.number.is_none()
            && self.location_id.is_none()
            && self.serial_number.is_none()
    }
}

/// Open/closed status reported to a locker device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerCurrentStatus {
    pub is_open: bool,
    pub locker_number: Option<i32>,
}

/// Response for the locker activity check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerActiveResponse {
    pub is_active: bool,
}
