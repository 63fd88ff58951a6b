//! Google Trends search-interest adapter.
//!
//! Queries a 7-day interest-over-time series for a set of keywords in one
//! batched request and reduces each keyword's series to its arithmetic
//! mean. The upstream endpoint is known-flaky (unofficial API, aggressive
//! rate limits), so this adapter never surfaces an error: any failure is
//! logged and whatever accumulated so far is returned, possibly nothing.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};

use flowpulse_core::{normalize_title, CanonicalObservation, Metrics};

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::types::TrendsResponse;
use crate::{build_http_client, FetchSettings};

const INTEREST_PATH: &str = "/trends/api/widgetdata/multiline";

/// Trends responses are prefixed with an anti-JSON-hijacking garbage line
/// (`)]}',`); everything before the first `{` is dropped before parsing.
fn strip_antijson_prefix(body: &str) -> &str {
    match body.find('{') {
        Some(idx) => &body[idx..],
        None => body,
    }
}

/// Client for the Google Trends interest-over-time endpoint.
pub struct TrendsClient {
    client: Client,
    base_url: Url,
    settings: FetchSettings,
}

impl TrendsClient {
    /// Creates a client for the trends service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built, or
    /// [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, settings: FetchSettings) -> Result<Self, FetchError> {
        let client = build_http_client(&settings)?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| FetchError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    /// Fetches one observation per keyword: `trend_score` is the mean
    /// 7-day interest, `views` a scaled synthetic approximation.
    ///
    /// Never fails; upstream errors are logged and swallowed.
    pub async fn fetch_trends(&self, keywords: &[String]) -> Vec<CanonicalObservation> {
        if keywords.is_empty() {
            return Vec::new();
        }

        match self.try_fetch(keywords).await {
            Ok(observations) => observations,
            Err(e) => {
                tracing::warn!(error = %e, "trends fetch failed, returning no observations");
                Vec::new()
            }
        }
    }

    async fn try_fetch(
        &self,
        keywords: &[String],
    ) -> Result<Vec<CanonicalObservation>, FetchError> {
        let response = self.fetch_interest_series(keywords).await?;

        // Columnar layout: point.value[i] is keyword i's interest sample.
        let mut sums = vec![0.0f64; keywords.len()];
        let mut counts = vec![0u32; keywords.len()];
        for point in &response.default.timeline_data {
            for (i, value) in point.value.iter().enumerate().take(keywords.len()) {
                sums[i] += value;
                counts[i] += 1;
            }
        }

        let observations = keywords
            .iter()
            .enumerate()
            .filter(|&(i, _)| counts[i] > 0)
            .map(|(i, keyword)| {
                let mean = sums[i] / f64::from(counts[i]);
                keyword_observation(keyword, mean)
            })
            .collect();

        Ok(observations)
    }

    async fn fetch_interest_series(
        &self,
        keywords: &[String],
    ) -> Result<TrendsResponse, FetchError> {
        let request_spec = serde_json::json!({
            "time": "now 7-d",
            "keywords": keywords,
        });

        let mut url = self
            .base_url
            .join(INTEREST_PATH)
            .map_err(|_| FetchError::InvalidBaseUrl(self.base_url.to_string()))?;
        url.query_pairs_mut()
            .append_pair("hl", "en-US")
            .append_pair("tz", "360")
            .append_pair("req", &request_spec.to_string());

        let body = retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || async {
                let resp = self.client.get(url.clone()).send().await?;
                let resp = resp.error_for_status()?;
                Ok(resp.text().await?)
            },
        )
        .await?;

        serde_json::from_str(strip_antijson_prefix(&body)).map_err(|e| FetchError::Deserialize {
            context: "trends interest-over-time".to_owned(),
            source: e,
        })
    }
}

/// Build the synthetic per-keyword observation. The keyword itself is the
/// observed entity: it becomes the title and (prefixed) source id.
fn keyword_observation(keyword: &str, mean_interest: f64) -> CanonicalObservation {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let synthetic_views = (mean_interest * 100.0) as u64;

    let mut metrics = Metrics::new();
    metrics.insert("views".to_string(), serde_json::json!(synthetic_views));
    metrics.insert("likes".to_string(), serde_json::json!(0));
    metrics.insert("comments".to_string(), serde_json::json!(0));
    metrics.insert("trend_score".to_string(), serde_json::json!(mean_interest));

    let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string();

    CanonicalObservation {
        platform: "GoogleTrends".to_string(),
        source_id: format!("kw-{keyword}"),
        source_url: Some(format!(
            "https://trends.google.com/trends/explore?q={encoded}"
        )),
        title: keyword.to_string(),
        normalized_title: normalize_title(keyword),
        country: "Global".to_string(),
        metrics,
        collected_at: None, // storage assigns now
    }
}
