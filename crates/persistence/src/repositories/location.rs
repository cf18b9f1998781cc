//! Location repository for database operations.

use async_trait::async_trait;
use domain::models::Location;
use domain::services::{LocationStore, StoreResult};
use sqlx::PgPool;

use super::store_error;
use crate::entities::LocationEntity;
use crate::metrics::QueryTimer;

/// Repository for location-related database operations.
#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    /// Creates a new LocationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for LocationRepository {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Location>> {
        let timer = QueryTimer::new("find_location_by_id");
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM locations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn find_all(&self) -> StoreResult<Vec<Location>> {
        let timer = QueryTimer::new("find_all_locations");
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM locations
            ORDER BY id
            "#,
        )
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
