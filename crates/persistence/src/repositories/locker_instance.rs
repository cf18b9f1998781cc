//! Locker instance repository for database operations.

use async_trait::async_trait;
use domain::models::LockerInstance;
use domain::services::{LockerInstanceStore, StoreResult};
use sqlx::PgPool;

use super::store_error;
use crate::entities::LockerInstanceEntity;
use crate::metrics::QueryTimer;

/// Repository for rental session reads.
#[derive(Clone)]
pub struct LockerInstanceRepository {
    pool: PgPool,
}

impl LockerInstanceRepository {
    /// Creates a new LockerInstanceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockerInstanceStore for LockerInstanceRepository {
    async fn find_in_use_by_locker_id(&self, locker_id: i64) -> StoreResult<Option<LockerInstance>> {
        let timer = QueryTimer::new("find_in_use_locker_instance");
        let result = sqlx::query_as::<_, LockerInstanceEntity>(
            r#"
            SELECT id, locker_id, owner_user_id, in_use, start_time, end_time
            FROM locker_instances
            WHERE locker_id = $1 AND in_use = TRUE
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(locker_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn find_by_locker_id(&self, locker_id: i64) -> StoreResult<Vec<LockerInstance>> {
        let timer = QueryTimer::new("find_locker_instances_by_locker");
        let result = sqlx::query_as::<_, LockerInstanceEntity>(
            r#"
            SELECT id, locker_id, owner_user_id, in_use, start_time, end_time
            FROM locker_instances
            WHERE locker_id = $1
            ORDER BY start_time DESC
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
}
