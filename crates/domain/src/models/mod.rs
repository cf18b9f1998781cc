//! Domain models for the locker rental backend.

pub mod auth;
pub mod location;
pub mod locker;
pub mod locker_instance;
pub mod locker_usage;

pub use auth::{JwtTokenInfo, LineAccessToken, State};
pub use location::Location;
pub use locker::{Locker, LockerAvailability, LockerCurrentStatus, LockerDetails};
pub use locker_instance::LockerInstance;
pub use locker_usage::{ActionType, LockerUsage};
