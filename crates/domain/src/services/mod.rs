//! Domain services for the locker rental backend.
//!
//! Services contain business logic that operates on domain models. Storage is
//! reached only through the ports in [`store`].

pub mod locker;
pub mod memory_store;
pub mod store;

pub use locker::{
    FindLockerOptions, LockerError, LockerLookup, LockerRelation, LockerService,
    LockerServiceConfig,
};
pub use memory_store::InMemoryStore;
pub use store::{
    LocationStore, LockerInstanceStore, LockerStore, LockerStores, LockerUsageStore, StoreError,
    StoreResult,
};
