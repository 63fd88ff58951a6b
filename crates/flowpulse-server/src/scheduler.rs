//! Scheduled ingestion jobs.
//!
//! Cadences match the collection plan: video search daily at midnight,
//! forum listing daily at half past, trend interest weekly on Monday
//! mornings. Job bodies delegate to [`IngestContext`], which handles its
//! own error accounting, so closures here stay trivial.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::ingest::IngestContext;

const YOUTUBE_SCHEDULE: &str = "0 0 0 * * *";
const DISCOURSE_SCHEDULE: &str = "0 30 0 * * *";
const TRENDS_SCHEDULE: &str = "0 0 1 * * MON";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler cannot be started.
pub async fn build_scheduler(ctx: Arc<IngestContext>) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let youtube_ctx = Arc::clone(&ctx);
    let job = Job::new_async(YOUTUBE_SCHEDULE, move |_uuid, _lock| {
        let ctx = Arc::clone(&youtube_ctx);
        Box::pin(async move {
            tracing::info!("scheduler: starting daily video-search run");
            ctx.run_youtube().await;
            tracing::info!("scheduler: daily video-search run complete");
        })
    })?;
    scheduler.add(job).await?;

    let discourse_ctx = Arc::clone(&ctx);
    let job = Job::new_async(DISCOURSE_SCHEDULE, move |_uuid, _lock| {
        let ctx = Arc::clone(&discourse_ctx);
        Box::pin(async move {
            tracing::info!("scheduler: starting daily forum-listing run");
            ctx.run_discourse().await;
            tracing::info!("scheduler: daily forum-listing run complete");
        })
    })?;
    scheduler.add(job).await?;

    let trends_ctx = Arc::clone(&ctx);
    let job = Job::new_async(TRENDS_SCHEDULE, move |_uuid, _lock| {
        let ctx = Arc::clone(&trends_ctx);
        Box::pin(async move {
            tracing::info!("scheduler: starting weekly trend-interest run");
            ctx.run_trends().await;
            tracing::info!("scheduler: weekly trend-interest run complete");
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    Ok(scheduler)
}
