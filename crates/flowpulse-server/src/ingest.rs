//! Glue between the fetch adapters, the search mirror, and the durable
//! upsert.
//!
//! A scheduled job never returns an error: failures are counted, logged,
//! and swallowed so one bad run cannot take the scheduler down. The mirror
//! write happens before the database transaction and is best-effort; only
//! the upsert decides whether a run counts as failed.

use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;

use flowpulse_core::CanonicalObservation;
use flowpulse_db::DbError;
use flowpulse_fetch::{DiscourseClient, FetchError, TrendsClient, YouTubeClient};
use flowpulse_search::SearchClient;

use crate::metrics::IngestMetrics;

/// How many forum listing pages each scheduled run walks.
pub const DISCOURSE_PAGES: u32 = 3;

/// Everything a scheduled job or the import endpoint needs to turn fetched
/// observations into rows. Built once at startup and shared behind an `Arc`.
pub struct IngestContext {
    pub pool: PgPool,
    pub youtube: YouTubeClient,
    pub discourse: DiscourseClient,
    pub trends: TrendsClient,
    /// `None` when the search mirror is disabled by configuration.
    pub search: Option<SearchClient>,
    pub metrics: Arc<IngestMetrics>,
    pub youtube_query: String,
    pub youtube_region: String,
    pub youtube_page_size: u32,
    pub keywords: Vec<String>,
}

impl IngestContext {
    /// Mirror a batch to the search index (best effort), then persist it
    /// through the transactional upsert.
    ///
    /// Mirror failures are logged per item and never block persistence.
    /// Returns the number of observations applied.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the upsert transaction fails; no rows from
    /// the batch persist in that case.
    pub async fn ingest_batch(&self, items: &[CanonicalObservation]) -> Result<u64, DbError> {
        if let Some(search) = &self.search {
            for item in items {
                if let Err(e) = search.index_observation(item).await {
                    tracing::warn!(
                        error = %e,
                        platform = %item.platform,
                        source_id = %item.source_id,
                        "search mirror write failed, continuing"
                    );
                }
            }
        }

        flowpulse_db::upsert_observations(&self.pool, items).await
    }

    pub async fn run_youtube(&self) {
        let started = Instant::now();
        let fetched = self
            .youtube
            .fetch(&self.youtube_query, &self.youtube_region, self.youtube_page_size)
            .await;
        self.finish_run("YouTube", "fetch_youtube", started, fetched).await;
    }

    pub async fn run_discourse(&self) {
        let started = Instant::now();
        let fetched = self.discourse.fetch_latest_topics(DISCOURSE_PAGES).await;
        self.finish_run("Discourse", "fetch_discourse", started, fetched).await;
    }

    pub async fn run_trends(&self) {
        let started = Instant::now();
        // The trends adapter degrades to empty on upstream trouble.
        let items = self.trends.fetch_trends(&self.keywords).await;
        self.finish_run("GoogleTrends", "fetch_trends", started, Ok(items))
            .await;
    }

    async fn finish_run(
        &self,
        platform: &str,
        job: &str,
        started: Instant,
        fetched: Result<Vec<CanonicalObservation>, FetchError>,
    ) {
        match fetched {
            Ok(items) => match self.ingest_batch(&items).await {
                Ok(applied) => {
                    self.metrics.record_items(platform, applied);
                    tracing::info!(platform, applied, "ingestion run complete");
                }
                Err(e) => {
                    self.metrics.record_failure(platform);
                    tracing::error!(platform, error = %e, "ingestion run failed during upsert");
                }
            },
            Err(e) => {
                self.metrics.record_failure(platform);
                tracing::error!(platform, error = %e, "ingestion run failed during fetch");
            }
        }

        self.metrics.observe_job(job, started.elapsed().as_secs_f64());
    }
}
