//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod location;
pub mod locker;
pub mod locker_instance;
pub mod locker_usage;

pub use location::LocationEntity;
pub use locker::{LockerAvailabilityDb, LockerEntity};
pub use locker_instance::LockerInstanceEntity;
pub use locker_usage::{ActionTypeDb, LockerUsageEntity};
