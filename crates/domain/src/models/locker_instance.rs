//! Locker instance domain model.
//!
//! A locker instance is one rental session of a physical locker by a user.
//! Sessions are opened and closed by the rental flow; the locker service only
//! reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerInstance {
    pub id: i64,
    #[serde(rename = "lockerID")]
    pub locker_id: i64,
    #[serde(rename = "ownerUserID")]
    pub owner_user_id: i64,
    pub in_use: bool,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}
