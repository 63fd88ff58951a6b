mod workflows;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ingest::IngestContext;
use crate::metrics::IngestMetrics;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ingest: Arc<IngestContext>,
    pub metrics: Arc<IngestMetrics>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn normalize_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

pub(super) fn map_db_error(error: &flowpulse_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new("internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/workflows", get(workflows::list_workflows))
        .route("/workflows/import", post(workflows::import_workflows))
        .route("/workflows/{id}", get(workflows::get_workflow))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthData>, ApiError> {
    match flowpulse_db::ping(&state.pool).await {
        Ok(()) => Ok(Json(HealthData {
            status: "ok",
            database: "up",
        })),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            Err(ApiError::new("unavailable", "database unreachable"))
        }
    }
}

async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.encode().map_err(|e| {
        tracing::error!(error = %e, "metrics encoding failed");
        ApiError::new("internal_error", "metrics encoding failed")
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
