//! The workflows table: row types, the reconciling batch upsert, and the
//! read queries behind the API.
//!
//! One row per `(platform, source_id)` pair, enforced by a unique
//! constraint rather than application-level checks so concurrent workers
//! racing on the same key converge on a single row.

use chrono::{DateTime, Utc};
use flowpulse_core::CanonicalObservation;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `workflows` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkflowRow {
    pub id: i64,
    pub platform: String,
    pub source_id: String,
    pub source_url: Option<String>,
    pub title: String,
    pub normalized_title: Option<String>,
    pub country: Option<String>,
    /// Metrics at the last upsert, replaced wholesale on each observation.
    pub popularity_metrics: Value,
    /// Mirror of `popularity_metrics`, kept as a distinct column for
    /// consumers expecting a rolling vs. historical distinction.
    pub latest_metrics: Value,
    /// JSON array of every metrics payload ever observed, in order.
    pub raw_snapshots: Value,
    /// Ranking value owned by an external scoring job; this crate only
    /// preserves it.
    pub score: Decimal,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sort order for workflow listings. Both sort descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowSort {
    #[default]
    Score,
    LastSeen,
}

impl WorkflowSort {
    /// Parse the API's `sort` query parameter. Unknown values fall back to
    /// the default score ordering.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("last_seen") => WorkflowSort::LastSeen,
            _ => WorkflowSort::Score,
        }
    }
}

/// Input filters for workflow listing.
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilters<'a> {
    pub platform: Option<&'a str>,
    pub country: Option<&'a str>,
    pub sort: WorkflowSort,
    pub limit: i64,
    pub offset: i64,
}

// ---------------------------------------------------------------------------
// Reconciling upsert
// ---------------------------------------------------------------------------

/// Merge a batch of canonical observations into the workflows table.
///
/// Applies every item inside a single transaction, in batch order:
///
/// - unseen `(platform, source_id)`: insert with `popularity_metrics` =
///   `latest_metrics` = the observed metrics and `raw_snapshots` containing
///   that one payload; `first_seen`/`last_seen` take `collected_at` when the
///   adapter supplied one, otherwise `NOW()`.
/// - existing key: replace `popularity_metrics`/`latest_metrics` wholesale,
///   append the payload to `raw_snapshots`, stamp `last_seen`/`updated_at`.
///   `score` and the first-observed descriptive fields are left untouched.
///
/// An empty batch is a no-op. On any failure the transaction is rolled back
/// and no rows from the batch persist.
///
/// Returns the number of observations applied.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement or the commit fails.
pub async fn upsert_observations(
    pool: &PgPool,
    items: &[CanonicalObservation],
) -> Result<u64, DbError> {
    if items.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut applied = 0u64;

    for item in items {
        let metrics = Value::Object(item.metrics.clone());
        sqlx::query(
            "INSERT INTO workflows \
               (platform, source_id, source_url, title, normalized_title, country, \
                popularity_metrics, latest_metrics, raw_snapshots, first_seen, last_seen) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7, jsonb_build_array($7::jsonb), \
                     COALESCE($8, NOW()), COALESCE($8, NOW())) \
             ON CONFLICT (platform, source_id) DO UPDATE SET \
               popularity_metrics = EXCLUDED.popularity_metrics, \
               latest_metrics = EXCLUDED.popularity_metrics, \
               raw_snapshots = workflows.raw_snapshots || EXCLUDED.popularity_metrics, \
               last_seen = NOW(), \
               updated_at = NOW()",
        )
        .bind(&item.platform)
        .bind(&item.source_id)
        .bind(&item.source_url)
        .bind(&item.title)
        .bind(&item.normalized_title)
        .bind(&item.country)
        .bind(metrics)
        .bind(item.collected_at)
        .execute(&mut *tx)
        .await?;
        applied += 1;
    }

    tx.commit().await?;
    Ok(applied)
}

// ---------------------------------------------------------------------------
// Read queries
// ---------------------------------------------------------------------------

const WORKFLOW_COLUMNS: &str = "id, platform, source_id, source_url, title, normalized_title, \
     country, popularity_metrics, latest_metrics, raw_snapshots, score, \
     first_seen, last_seen, inserted_at, updated_at";

/// List workflow records with optional platform/country filters.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_workflows(
    pool: &PgPool,
    filters: WorkflowFilters<'_>,
) -> Result<Vec<WorkflowRow>, DbError> {
    // ORDER BY cannot take a bind parameter; pick the statement by variant.
    let sql = match filters.sort {
        WorkflowSort::Score => format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflows \
             WHERE ($1::TEXT IS NULL OR platform = $1) \
               AND ($2::TEXT IS NULL OR country = $2) \
             ORDER BY score DESC, id DESC \
             LIMIT $3 OFFSET $4"
        ),
        WorkflowSort::LastSeen => format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflows \
             WHERE ($1::TEXT IS NULL OR platform = $1) \
               AND ($2::TEXT IS NULL OR country = $2) \
             ORDER BY last_seen DESC, id DESC \
             LIMIT $3 OFFSET $4"
        ),
    };

    let rows = sqlx::query_as::<_, WorkflowRow>(&sql)
        .bind(filters.platform)
        .bind(filters.country)
        .bind(filters.limit)
        .bind(filters.offset)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch one workflow record by surrogate id, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_workflow(pool: &PgPool, id: i64) -> Result<Option<WorkflowRow>, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
