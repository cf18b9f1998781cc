//! Locker usage log domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical action recorded against a locker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Open,
    Close,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Open => write!(f, "OPEN"),
            ActionType::Close => write!(f, "CLOSE"),
        }
    }
}

/// One immutable entry of a locker instance's usage log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerUsage {
    pub id: i64,
    #[serde(rename = "lockerInstanceID")]
    pub locker_instance_id: i64,
    pub action_type: ActionType,
    pub created_at: DateTime<Utc>,
}

/// Returns the most recent entry of a usage log.
///
/// Entries are ordered by creation time; entries created in the same instant
/// are ordered by id.
pub fn latest_usage(usages: &[LockerUsage]) -> Option<&LockerUsage> {
    usages.iter().max_by_key(|u| (u.created_at, u.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn usage(id: i64, action_type: ActionType, offset_secs: i64) -> LockerUsage {
        LockerUsage {
            id,
            locker_instance_id: 1,
            action_type,
            created_at: Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_action_type_serialization() {
        assert_eq!(serde_json::to_string(&ActionType::Open).unwrap(), "\"OPEN\"");
        assert_eq!(serde_json::to_string(&ActionType::Close).unwrap(), "\"CLOSE\"");
        assert_eq!(ActionType::Close.to_string(), "CLOSE");
    }

    #[test]
    fn test_latest_usage_empty() {
        assert!(latest_usage(&[]).is_none());
    }

    #[test]
    fn test_latest_usage_by_time_not_position() {
        let log = vec![usage(2, ActionType::Close, 60), usage(1, ActionType::Open, 0)];
        assert_eq!(latest_usage(&log).unwrap().action_type, ActionType::Close);
    }

    #[test]
    fn test_latest_usage_same_instant_uses_id() {
        let log = vec![usage(8, ActionType::Open, 0), usage(7, ActionType::Close, 0)];
        assert_eq!(latest_usage(&log).unwrap().id, 8);
    }
}
