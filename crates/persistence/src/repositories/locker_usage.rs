//! Locker usage repository for database operations.

use async_trait::async_trait;
use domain::models::{ActionType, LockerUsage};
use domain::services::{LockerUsageStore, StoreResult};
use sqlx::PgPool;

use super::store_error;
use crate::entities::{ActionTypeDb, LockerUsageEntity};
use crate::metrics::QueryTimer;

/// Repository for the append-only usage log.
#[derive(Clone)]
pub struct LockerUsageRepository {
    pool: PgPool,
}

impl LockerUsageRepository {
    /// Creates a new LockerUsageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockerUsageStore for LockerUsageRepository {
    async fn find_by_locker_id(&self, locker_id: i64) -> StoreResult<Vec<LockerUsage>> {
        let timer = QueryTimer::new("find_locker_usages_by_locker");
        let result = sqlx::query_as::<_, LockerUsageEntity>(
            r#"
            SELECT u.id, u.locker_instance_id, u.action_type, u.created_at
            FROM locker_usages u
            JOIN locker_instances i ON u.locker_instance_id = i.id
            WHERE i.locker_id = $1
            ORDER BY u.created_at DESC, u.id DESC
            "#,
        )
        .bind(locker_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn record(
        &self,
        locker_instance_id: i64,
        action_type: ActionType,
    ) -> StoreResult<LockerUsage> {
        let timer = QueryTimer::new("record_locker_usage");
        let result = sqlx::query_as::<_, LockerUsageEntity>(
            r#"
            INSERT INTO locker_usages (locker_instance_id, action_type)
            VALUES ($1, $2)
            RETURNING id, locker_instance_id, action_type, created_at
            "#,
        )
        .bind(locker_instance_id)
        .bind(ActionTypeDb::from(action_type))
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(store_error)?.into())
    }
}
