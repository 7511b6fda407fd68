//! Sync-run bookkeeping and the externally persisted continuation offset.
//!
//! A run row is created per scheduled invocation and closed with its terminal
//! outcome. The single-row `sync_state` table carries the only state that
//! survives between invocations: the offset the next sub-batch starts from.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::CatalogError;

/// A row from the `sync_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRunRow {
    pub id: i64,
    /// `"batch"`, `"full"`, or `"refresh"`.
    pub kind: String,
    /// What started the run: `"cli"`, `"cron"`.
    pub trigger: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub items_processed: i32,
    /// `"completed"`, `"exhausted"`, or `"failed"`; `NULL` while running.
    pub outcome: Option<String>,
    pub error_message: Option<String>,
}

/// Inserts a new running `sync_runs` row.
///
/// # Errors
///
/// Returns [`CatalogError::Sqlx`] if the insert fails.
pub async fn create_sync_run(
    pool: &PgPool,
    kind: &str,
    trigger: &str,
) -> Result<SyncRunRow, CatalogError> {
    let row = sqlx::query_as::<_, SyncRunRow>(
        "INSERT INTO sync_runs (kind, trigger, started_at, items_processed) \
         VALUES ($1, $2, NOW(), 0) \
         RETURNING id, kind, trigger, started_at, finished_at, items_processed, \
                   outcome, error_message",
    )
    .bind(kind)
    .bind(trigger)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Closes a run with a successful outcome (`"completed"` or `"exhausted"`).
///
/// # Errors
///
/// Returns [`CatalogError::Sqlx`] if the update fails.
pub async fn complete_sync_run(
    pool: &PgPool,
    run_id: i64,
    items_processed: i32,
    outcome: &str,
) -> Result<(), CatalogError> {
    sqlx::query(
        "UPDATE sync_runs SET \
             finished_at = NOW(), items_processed = $2, outcome = $3 \
         WHERE id = $1",
    )
    .bind(run_id)
    .bind(items_processed)
    .bind(outcome)
    .execute(pool)
    .await?;
    Ok(())
}

/// Closes a run as `"failed"` with an error message.
///
/// # Errors
///
/// Returns [`CatalogError::Sqlx`] if the update fails.
pub async fn fail_sync_run(
    pool: &PgPool,
    run_id: i64,
    error_message: &str,
) -> Result<(), CatalogError> {
    sqlx::query(
        "UPDATE sync_runs SET \
             finished_at = NOW(), outcome = 'failed', error_message = $2 \
         WHERE id = $1",
    )
    .bind(run_id)
    .bind(error_message)
    .execute(pool)
    .await?;
    Ok(())
}

/// Reads the persisted continuation offset, if a batched sync is mid-flight.
///
/// # Errors
///
/// Returns [`CatalogError::Sqlx`] if the query fails.
pub async fn get_next_offset(pool: &PgPool) -> Result<Option<i64>, CatalogError> {
    let offset = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT next_offset FROM sync_state WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?
    .flatten();
    Ok(offset)
}

/// Persists (or clears, with `None`) the continuation offset.
///
/// # Errors
///
/// Returns [`CatalogError::Sqlx`] if the upsert fails.
pub async fn set_next_offset(pool: &PgPool, offset: Option<i64>) -> Result<(), CatalogError> {
    sqlx::query(
        "INSERT INTO sync_state (id, next_offset) VALUES (1, $1) \
         ON CONFLICT (id) DO UPDATE SET next_offset = EXCLUDED.next_offset",
    )
    .bind(offset)
    .execute(pool)
    .await?;
    Ok(())
}
