//! `YouTube` video-search adapter.
//!
//! Two-phase fetch: `search` for candidate video ids, then a batched
//! `videos` call for statistics and snippet detail. A missing or
//! placeholder API key degrades to an empty result set so the rest of the
//! schedule keeps running.

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};

use flowpulse_core::{compute_ratios, normalize_title, CanonicalObservation};

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::types::{YtSearchResponse, YtVideoListResponse};
use crate::{build_http_client, FetchSettings};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Placeholder value shipped in sample env files; treated as no key at all.
const PLACEHOLDER_KEY: &str = "YOUR_YT_KEY";

/// Client for the `YouTube` Data API v3.
pub struct YouTubeClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    settings: FetchSettings,
}

impl YouTubeClient {
    /// Creates a client pointed at the production `YouTube` API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<String>, settings: FetchSettings) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built, or
    /// [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<String>,
        settings: FetchSettings,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        let client = build_http_client(&settings)?;
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| FetchError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            api_key,
            base_url,
            settings,
        })
    }

    /// Fetches popularity observations for videos matching `query`.
    ///
    /// Searches for up to `page_size` candidate videos in `region`, then
    /// batch-fetches their statistics. Returns an empty Vec (with a warning)
    /// when no usable API key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] once transient-failure retries are exhausted
    /// or a response cannot be parsed.
    pub async fn fetch(
        &self,
        query: &str,
        region: &str,
        page_size: u32,
    ) -> Result<Vec<CanonicalObservation>, FetchError> {
        let Some(api_key) = self.usable_api_key() else {
            tracing::warn!("no usable YOUTUBE_API_KEY configured, skipping YouTube fetch");
            return Ok(Vec::new());
        };

        let video_ids = self.search_video_ids(api_key, query, region, page_size).await?;
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.fetch_video_details(api_key, &video_ids, region).await
    }

    fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_KEY)
    }

    /// Phase one: search for candidate video ids. Items without a video id
    /// (channels, playlists) are skipped.
    async fn search_video_ids(
        &self,
        api_key: &str,
        query: &str,
        region: &str,
        page_size: u32,
    ) -> Result<Vec<String>, FetchError> {
        let mut url = self.endpoint("search")?;
        url.query_pairs_mut()
            .append_pair("part", "id,snippet")
            .append_pair("q", query)
            .append_pair("type", "video")
            .append_pair("maxResults", &page_size.to_string())
            .append_pair("regionCode", region)
            .append_pair("key", api_key);

        let response: YtSearchResponse = self.request_json(url, "youtube search").await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    /// Phase two: batch statistics/snippet detail for the found ids.
    async fn fetch_video_details(
        &self,
        api_key: &str,
        video_ids: &[String],
        region: &str,
    ) -> Result<Vec<CanonicalObservation>, FetchError> {
        let mut url = self.endpoint("videos")?;
        url.query_pairs_mut()
            .append_pair("part", "statistics,snippet")
            .append_pair("id", &video_ids.join(","))
            .append_pair("key", api_key);

        let response: YtVideoListResponse = self.request_json(url, "youtube videos").await?;

        let observations = response
            .items
            .into_iter()
            .map(|item| {
                let views = parse_count(item.statistics.view_count.as_deref());
                let likes = parse_count(item.statistics.like_count.as_deref());
                let comments = parse_count(item.statistics.comment_count.as_deref());

                CanonicalObservation {
                    platform: "YouTube".to_string(),
                    source_id: item.id.clone(),
                    source_url: Some(format!("https://www.youtube.com/watch?v={}", item.id)),
                    normalized_title: normalize_title(&item.snippet.title),
                    title: item.snippet.title,
                    country: region.to_string(),
                    metrics: compute_ratios(views, likes, comments),
                    collected_at: item
                        .snippet
                        .published_at
                        .as_deref()
                        .and_then(parse_timestamp),
                }
            })
            .collect();

        Ok(observations)
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|_| FetchError::InvalidBaseUrl(self.base_url.to_string()))
    }

    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, FetchError> {
        let body = retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || async {
                let resp = self.client.get(url.clone()).send().await?;
                let resp = resp.error_for_status()?;
                Ok(resp.json::<serde_json::Value>().await?)
            },
        )
        .await?;

        serde_json::from_value(body).map_err(|e| FetchError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_handles_absent_and_garbage() {
        assert_eq!(parse_count(None), 0);
        assert_eq!(parse_count(Some("")), 0);
        assert_eq!(parse_count(Some("not-a-number")), 0);
        assert_eq!(parse_count(Some("1234")), 1234);
    }

    #[test]
    fn placeholder_key_is_not_usable() {
        let client =
            YouTubeClient::new(Some(PLACEHOLDER_KEY.to_string()), FetchSettings::default())
                .unwrap();
        assert!(client.usable_api_key().is_none());

        let client = YouTubeClient::new(None, FetchSettings::default()).unwrap();
        assert!(client.usable_api_key().is_none());

        let client =
            YouTubeClient::new(Some("real-key".to_string()), FetchSettings::default()).unwrap();
        assert_eq!(client.usable_api_key(), Some("real-key"));
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        assert!(parse_timestamp("2025-06-01T12:00:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
