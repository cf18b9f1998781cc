//! Locker usage entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::ActionType;
use sqlx::FromRow;

/// Database enum for usage actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "action_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionTypeDb {
    Open,
    Close,
}

impl From<ActionTypeDb> for ActionType {
    fn from(value: ActionTypeDb) -> Self {
        match value {
            ActionTypeDb::Open => ActionType::Open,
            ActionTypeDb::Close => ActionType::Close,
        }
    }
}

impl From<ActionType> for ActionTypeDb {
    fn from(value: ActionType) -> Self {
        match value {
            ActionType::Open => ActionTypeDb::Open,
            ActionType::Close => ActionTypeDb::Close,
        }
    }
}

/// Database row mapping for the locker_usages table.
#[derive(Debug, Clone, FromRow)]
pub struct LockerUsageEntity {
    pub id: i64,
    pub locker_instance_id: i64,
    pub action_type: ActionTypeDb,
    pub created_at: DateTime<Utc>,
}

impl From<LockerUsageEntity> for domain::models::LockerUsage {
    fn from(entity: LockerUsageEntity) -> Self {
        Self {
            id: entity.id,
            locker_instance_id: entity.locker_instance_id,
            action_type: entity.action_type.into(),
            created_at: entity.created_at,
        }
    }
}
