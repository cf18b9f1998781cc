//! Query and pool metrics for the locker store.
//!
//! Every repository call is wrapped in a [`QueryTimer`]; the readiness probe
//! refreshes the pool gauges.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

const QUERY_DURATION: &str = "locker_store_query_duration_seconds";
const QUERY_TOTAL: &str = "locker_store_queries_total";

/// Outcome label of a finished query.
fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Times one named store query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_locker_by_serial_number");
/// let result = sqlx::query_as::<_, LockerEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time and counts the query under its outcome.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let elapsed = self.start.elapsed().as_secs_f64();
        histogram!(QUERY_DURATION, "query" => self.query).record(elapsed);
        counter!(QUERY_TOTAL, "query" => self.query, "outcome" => outcome(result)).increment(1);
    }
}

/// Publishes pool occupancy gauges.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("locker_store_connections_total").set(size as f64);
    gauge!("locker_store_connections_idle").set(idle as f64);
    gauge!("locker_store_connections_active").set(size.saturating_sub(idle) as f64);
}
