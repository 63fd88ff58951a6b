//! Discourse forum-topics adapter.
//!
//! Paginates the `/latest.json` listing, stopping early when a page comes
//! back empty or the endpoint answers 404 (Discourse's "no more pages"
//! signal). API credentials are attached only when both the key and the
//! acting username are configured.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};

use flowpulse_core::{compute_ratios, normalize_title, CanonicalObservation};

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::types::{LatestTopicsResponse, Topic};
use crate::{build_http_client, FetchSettings};

/// Client for a Discourse forum's public JSON endpoints.
pub struct DiscourseClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    api_user: Option<String>,
    settings: FetchSettings,
}

impl DiscourseClient {
    /// Creates a client for the forum at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built, or
    /// [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        api_user: Option<String>,
        settings: FetchSettings,
    ) -> Result<Self, FetchError> {
        let client = build_http_client(&settings)?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| FetchError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            api_user,
            settings,
        })
    }

    /// Fetches up to `pages` pages of latest topics as observations.
    ///
    /// Topics without an id are skipped rather than fabricated. Pagination
    /// stops at the first empty page or 404, whichever comes first.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] once transient-failure retries are exhausted
    /// or a response cannot be parsed.
    pub async fn fetch_latest_topics(
        &self,
        pages: u32,
    ) -> Result<Vec<CanonicalObservation>, FetchError> {
        let mut results = Vec::new();

        for page in 0..pages {
            let Some(listing) = self.fetch_page(page).await? else {
                break; // 404: the forum has no more pages
            };

            let topics = listing.topic_list.topics;
            if topics.is_empty() {
                break;
            }

            for topic in topics {
                if let Some(observation) = self.topic_to_observation(topic) {
                    results.push(observation);
                }
            }
        }

        Ok(results)
    }

    /// Fetch one listing page; `None` means the endpoint answered 404.
    async fn fetch_page(&self, page: u32) -> Result<Option<LatestTopicsResponse>, FetchError> {
        let mut url = self
            .base_url
            .join("/latest.json")
            .map_err(|_| FetchError::InvalidBaseUrl(self.base_url.to_string()))?;
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let body = retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || async {
                let mut request = self
                    .client
                    .get(url.clone())
                    .header("Content-Type", "application/json");

                // Both halves of the credential pair are required; a key
                // without an acting username is rejected by Discourse.
                if let (Some(key), Some(user)) = (&self.api_key, &self.api_user) {
                    request = request.header("Api-Key", key).header("Api-Username", user);
                }

                let resp = request.send().await?;
                if resp.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                let resp = resp.error_for_status()?;
                Ok(Some(resp.json::<serde_json::Value>().await?))
            },
        )
        .await?;

        match body {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| FetchError::Deserialize {
                    context: format!("discourse latest.json page={page}"),
                    source: e,
                }),
        }
    }

    fn topic_to_observation(&self, topic: Topic) -> Option<CanonicalObservation> {
        let id = topic.id?;

        // Url renders with a trailing slash; trim it before joining.
        let base = self.base_url.as_str().trim_end_matches('/');
        let source_url = topic
            .slug
            .as_deref()
            .map(|slug| format!("{base}/t/{slug}/{id}"));

        // posts_count includes the opening post; replies are the signal.
        let comments = topic.posts_count.saturating_sub(1);
        let metrics = compute_ratios(topic.views, topic.like_count, comments);

        Some(CanonicalObservation {
            platform: "Discourse".to_string(),
            source_id: id.to_string(),
            source_url,
            normalized_title: normalize_title(&topic.title),
            title: topic.title,
            country: "Global".to_string(),
            metrics,
            collected_at: topic.created_at.as_deref().and_then(parse_timestamp),
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DiscourseClient {
        DiscourseClient::new("https://forum.n8n.io", None, None, FetchSettings::default())
            .unwrap()
    }

    #[test]
    fn topic_without_id_is_skipped() {
        let topic = Topic {
            id: None,
            slug: Some("orphan".to_string()),
            title: "Orphan topic".to_string(),
            views: 10,
            like_count: 1,
            posts_count: 3,
            created_at: None,
        };
        assert!(client().topic_to_observation(topic).is_none());
    }

    #[test]
    fn reply_count_excludes_opening_post() {
        let topic = Topic {
            id: Some(42),
            slug: Some("webhook-help".to_string()),
            title: "Webhook help".to_string(),
            views: 100,
            like_count: 5,
            posts_count: 4,
            created_at: None,
        };
        let obs = client().topic_to_observation(topic).unwrap();
        assert_eq!(obs.metrics["comments"], 3);
        assert_eq!(obs.metrics["views"], 100);
        assert_eq!(obs.country, "Global");
        assert_eq!(
            obs.source_url.as_deref(),
            Some("https://forum.n8n.io/t/webhook-help/42")
        );
    }

    #[test]
    fn zero_posts_does_not_underflow() {
        let topic = Topic {
            id: Some(1),
            slug: None,
            title: "Empty".to_string(),
            views: 0,
            like_count: 0,
            posts_count: 0,
            created_at: None,
        };
        let obs = client().topic_to_observation(topic).unwrap();
        assert_eq!(obs.metrics["comments"], 0);
        assert!(obs.source_url.is_none());
    }
}
