//! Offline unit tests for flowpulse-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use flowpulse_core::{AppConfig, Environment};
use flowpulse_db::{PoolConfig, WorkflowFilters, WorkflowRow, WorkflowSort};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        fetch_timeout_secs: 30,
        fetch_max_retries: 2,
        fetch_backoff_base_ms: 1000,
        fetch_user_agent: "ua".to_string(),
        youtube_api_key: None,
        youtube_query: "n8n automation".to_string(),
        youtube_region: "US".to_string(),
        youtube_page_size: 50,
        discourse_base_url: "https://forum.n8n.io".to_string(),
        discourse_api_key: None,
        discourse_api_user: None,
        trends_base_url: "https://trends.google.com".to_string(),
        keywords_path: None,
        search_mirror_enabled: false,
        opensearch_url: "http://localhost:9200".to_string(),
        opensearch_user: "admin".to_string(),
        opensearch_password: "admin".to_string(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pool_config_default_values() {
    let pool_config = PoolConfig::default();
    assert_eq!(pool_config.max_connections, 10);
    assert_eq!(pool_config.min_connections, 1);
    assert_eq!(pool_config.acquire_timeout_secs, 10);
}

/// Compile-time smoke test: confirm that [`WorkflowRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn workflow_row_has_expected_fields() {
    use chrono::Utc;
    use rust_decimal::Decimal;

    let now = Utc::now();
    let metrics = serde_json::json!({"views": 1000, "likes": 50});

    let row = WorkflowRow {
        id: 1_i64,
        platform: "YouTube".to_string(),
        source_id: "v1".to_string(),
        source_url: Some("https://www.youtube.com/watch?v=v1".to_string()),
        title: "How To n8n".to_string(),
        normalized_title: Some("how to n8n".to_string()),
        country: Some("US".to_string()),
        popularity_metrics: metrics.clone(),
        latest_metrics: metrics.clone(),
        raw_snapshots: serde_json::json!([metrics]),
        score: Decimal::ZERO,
        first_seen: now,
        last_seen: now,
        inserted_at: now,
        updated_at: now,
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.platform, "YouTube");
    assert_eq!(row.popularity_metrics, row.latest_metrics);
    assert_eq!(row.raw_snapshots.as_array().map(Vec::len), Some(1));
    assert_eq!(row.score, Decimal::ZERO);
}

#[test]
fn workflow_filters_default_is_unfiltered_score_sort() {
    let filters = WorkflowFilters::default();
    assert!(filters.platform.is_none());
    assert!(filters.country.is_none());
    assert_eq!(filters.sort, WorkflowSort::Score);
    assert_eq!(filters.limit, 0);
    assert_eq!(filters.offset, 0);
}
