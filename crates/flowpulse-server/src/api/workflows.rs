use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowpulse_core::{normalize_title, CanonicalObservation};
use flowpulse_db::{WorkflowFilters, WorkflowRow, WorkflowSort};

use super::{map_db_error, normalize_limit, normalize_offset, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    platform: Option<String>,
    country: Option<String>,
    sort: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Read model for a workflow record. The display title travels as
/// `workflow`, matching the canonical wire shape.
#[derive(Debug, Serialize)]
pub struct WorkflowRead {
    id: i64,
    platform: String,
    source_id: String,
    source_url: Option<String>,
    #[serde(rename = "workflow")]
    title: String,
    normalized_title: Option<String>,
    country: Option<String>,
    popularity_metrics: Value,
    latest_metrics: Value,
    raw_snapshots: Value,
    score: Decimal,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl From<WorkflowRow> for WorkflowRead {
    fn from(row: WorkflowRow) -> Self {
        Self {
            id: row.id,
            platform: row.platform,
            source_id: row.source_id,
            source_url: row.source_url,
            title: row.title,
            normalized_title: row.normalized_title,
            country: row.country,
            popularity_metrics: row.popularity_metrics,
            latest_metrics: row.latest_metrics,
            raw_snapshots: row.raw_snapshots,
            score: row.score,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
        }
    }
}

pub async fn list_workflows(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<WorkflowRead>>, ApiError> {
    let filters = WorkflowFilters {
        platform: params.platform.as_deref(),
        country: params.country.as_deref(),
        sort: WorkflowSort::parse(params.sort.as_deref()),
        limit: normalize_limit(params.limit),
        offset: normalize_offset(params.offset),
    };

    let rows = flowpulse_db::list_workflows(&state.pool, filters)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(rows.into_iter().map(WorkflowRead::from).collect()))
}

pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkflowRead>, ApiError> {
    let row = flowpulse_db::get_workflow(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;

    match row {
        Some(row) => Ok(Json(row.into())),
        None => Err(ApiError::new(
            "not_found",
            format!("workflow {id} not found"),
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    accepted: u64,
}

/// Accepts a batch of externally produced observations and pushes it
/// through the same mirror-then-upsert path the scheduled jobs use.
pub async fn import_workflows(
    State(state): State<AppState>,
    Json(items): Json<Vec<CanonicalObservation>>,
) -> Result<Json<ImportResult>, ApiError> {
    // Callers are not trusted to canonicalize titles themselves.
    let items: Vec<CanonicalObservation> = items
        .into_iter()
        .map(|mut item| {
            item.normalized_title = normalize_title(&item.title);
            item
        })
        .collect();

    let accepted = state
        .ingest
        .ingest_batch(&items)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(ImportResult { accepted }))
}
