mod api;
mod ingest;
mod metrics;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    ingest::IngestContext,
    metrics::IngestMetrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load_app_config pulls in .env itself; nothing else to do first.
    let config = flowpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(config = ?config, "starting flowpulse");

    let pool_config = flowpulse_db::PoolConfig::from_app_config(&config);
    let pool = flowpulse_db::connect_pool(&config.database_url, pool_config).await?;
    flowpulse_db::run_migrations(&pool).await?;

    let settings = flowpulse_fetch::FetchSettings::from_app_config(&config);
    let youtube =
        flowpulse_fetch::YouTubeClient::new(config.youtube_api_key.clone(), settings.clone())?;
    let discourse = flowpulse_fetch::DiscourseClient::new(
        &config.discourse_base_url,
        config.discourse_api_key.clone(),
        config.discourse_api_user.clone(),
        settings.clone(),
    )?;
    let trends = flowpulse_fetch::TrendsClient::new(&config.trends_base_url, settings)?;

    let keywords = match &config.keywords_path {
        Some(path) => flowpulse_core::load_trend_keywords(path)?,
        None => flowpulse_core::default_trend_keywords(),
    };

    let search = if config.search_mirror_enabled {
        let client = flowpulse_search::SearchClient::new(
            &config.opensearch_url,
            &config.opensearch_user,
            &config.opensearch_password,
        )?;
        // The cluster may still be starting; mirroring stays best-effort
        // either way.
        if let Err(e) = client.ensure_index().await {
            tracing::warn!(error = %e, "could not prepare search index at startup");
        }
        Some(client)
    } else {
        None
    };

    let metrics = Arc::new(IngestMetrics::new()?);
    let ctx = Arc::new(IngestContext {
        pool: pool.clone(),
        youtube,
        discourse,
        trends,
        search,
        metrics: Arc::clone(&metrics),
        youtube_query: config.youtube_query.clone(),
        youtube_region: config.youtube_region.clone(),
        youtube_page_size: config.youtube_page_size,
        keywords,
    });

    let _scheduler = scheduler::build_scheduler(Arc::clone(&ctx)).await?;

    let app = build_app(AppState {
        pool,
        ingest: ctx,
        metrics,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
