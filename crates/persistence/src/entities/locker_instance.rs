//! Locker instance entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the locker_instances table.
#[derive(Debug, Clone, FromRow)]
pub struct LockerInstanceEntity {
    pub id: i64,
    pub locker_id: i64,
    pub owner_user_id: i64,
    pub in_use: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<LockerInstanceEntity> for domain::models::LockerInstance {
    fn from(entity: LockerInstanceEntity) -> Self {
        Self {
            id: entity.id,
            locker_id: entity.locker_id,
            owner_user_id: entity.owner_user_id,
            in_use: entity.in_use,
            start_time: entity.start_time,
            end_time: entity.end_time,
        }
    }
}
