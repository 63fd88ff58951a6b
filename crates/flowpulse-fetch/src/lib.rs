//! Per-platform fetch adapters.
//!
//! Each adapter wraps `reqwest` with platform-specific request building and
//! converts the raw payload into [`flowpulse_core::CanonicalObservation`]
//! records. Transient HTTP failures are retried with bounded exponential
//! backoff; missing credentials degrade to an empty result so one
//! misconfigured source never blocks the rest of the schedule.

mod discourse;
mod error;
mod retry;
mod trends;
mod types;
mod youtube;

pub use discourse::DiscourseClient;
pub use error::FetchError;
pub use trends::TrendsClient;
pub use youtube::YouTubeClient;

/// HTTP/retry settings shared by all adapters, taken from the app config
/// once at startup.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    /// Additional attempts after the first, so 2 retries = 3 tries total.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub user_agent: String,
}

impl FetchSettings {
    #[must_use]
    pub fn from_app_config(config: &flowpulse_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch_timeout_secs,
            max_retries: config.fetch_max_retries,
            backoff_base_ms: config.fetch_backoff_base_ms,
            user_agent: config.fetch_user_agent.clone(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            backoff_base_ms: 1000,
            user_agent: "flowpulse/0.1 (workflow-popularity)".to_string(),
        }
    }
}

pub(crate) fn build_http_client(
    settings: &FetchSettings,
) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(settings.timeout_secs))
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent(settings.user_agent.clone())
        .build()?;
    Ok(client)
}
