//! Locker repository for database operations.

use async_trait::async_trait;
use domain::models::locker::{EditLockerRequest, NewLocker};
use domain::models::Locker;
use domain::services::{LockerStore, StoreResult};
use sqlx::PgPool;

use super::store_error;
use crate::entities::{LockerAvailabilityDb, LockerEntity};
use crate::metrics::QueryTimer;

const LOCKER_COLUMNS: &str =
    "id, serial_number, name, number, availability, location_id, created_at, updated_at";

/// Repository for locker-related database operations.
#[derive(Clone)]
pub struct LockerRepository {
    pool: PgPool,
}

impl LockerRepository {
    /// Creates a new LockerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockerStore for LockerRepository {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Locker>> {
        let timer = QueryTimer::new("find_locker_by_id");
        let result = sqlx::query_as::<_, LockerEntity>(&format!(
            "SELECT {} FROM lockers WHERE id = $1",
            LOCKER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn find_by_serial_number(&self, serial_number: &str) -> StoreResult<Option<Locker>> {
        let timer = QueryTimer::new("find_locker_by_serial_number");
        let result = sqlx::query_as::<_, LockerEntity>(&format!(
            "SELECT {} FROM lockers WHERE serial_number = $1",
            LOCKER_COLUMNS
        ))
        .bind(serial_number)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn find_all(&self) -> StoreResult<Vec<Locker>> {
        let timer = QueryTimer::new("find_all_lockers");
        let result = sqlx::query_as::<_, LockerEntity>(&format!(
            "SELECT {} FROM lockers ORDER BY id",
            LOCKER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn insert(&self, locker: NewLocker) -> StoreResult<Locker> {
        let timer = QueryTimer::new("insert_locker");
        let result = sqlx::query_as::<_, LockerEntity>(&format!(
            r#"
            INSERT INTO lockers (serial_number, availability)
            VALUES ($1, $2)
            RETURNING {}
            "#,
            LOCKER_COLUMNS
        ))
        .bind(&locker.serial_number)
        .bind(LockerAvailabilityDb::Unregistered)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(store_error)?.into())
    }

    async fn save(&self, locker: &Locker) -> StoreResult<Locker> {
        let timer = QueryTimer::new("save_locker");
        let result = sqlx::query_as::<_, LockerEntity>(&format!(
            r#"
            UPDATE lockers
            SET serial_number = $2, name = $3, number = $4, availability = $5,
                location_id = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LOCKER_COLUMNS
        ))
        .bind(locker.id)
        .bind(&locker.serial_number)
        .bind(&locker.name)
        .bind(locker.number)
        .bind(LockerAvailabilityDb::from(locker.availability))
        .bind(locker.location_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result.map_err(store_error)?.into())
    }

    async fn update(&self, id: i64, changes: &EditLockerRequest) -> StoreResult<()> {
        let timer = QueryTimer::new("update_locker");
        let result = sqlx::query(
            r#"
            UPDATE lockers
            SET name = COALESCE($2, name),
                number = COALESCE($3, number),
                location_id = COALESCE($4, location_id),
                serial_number = COALESCE($5, serial_number),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.number)
        .bind(changes.location_id)
        .bind(&changes.serial_number)
        .execute(&self.pool)
        .await;
        timer.finish(&result);
        result.map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let timer = QueryTimer::new("delete_locker");
        let result = sqlx::query("DELETE FROM lockers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        result.map_err(store_error)?;
        Ok(())
    }
}
