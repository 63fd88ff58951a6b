//! Best-effort mirror of workflow observations into an `OpenSearch` index.
//!
//! This is a side channel, not a system of record: the ingestion pipeline
//! attempts the mirror before the durable write and logs-and-continues on
//! any failure here. Nothing in this crate is allowed to abort an upsert.
//!
//! Speaks the `OpenSearch` REST API directly over reqwest with basic auth,
//! which keeps the dependency surface identical to the fetch adapters.

use std::time::Duration;

use flowpulse_core::CanonicalObservation;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

const INDEX_NAME: &str = "flowpulse_workflows";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid OpenSearch URL '{0}'")]
    InvalidUrl(String),

    #[error("OpenSearch rejected the request: {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Client for the `OpenSearch` mirror index.
///
/// Constructed once at process start and injected into the ingestion
/// pipeline; holds no mutable state.
pub struct SearchClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl SearchClient {
    /// Creates a client for the cluster at `base_url` with basic auth.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built, or
    /// [`SearchError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| SearchError::InvalidUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            base_url,
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    /// Creates the mirror index if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport failure or a non-2xx response
    /// to the create call.
    pub async fn ensure_index(&self) -> Result<(), SearchError> {
        let index_url = self.url(INDEX_NAME)?;

        let head = self
            .client
            .head(index_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        if head.status().is_success() {
            return Ok(());
        }

        let body = serde_json::json!({
            "settings": { "index": { "number_of_shards": 1, "number_of_replicas": 0 } },
            "mappings": {
                "properties": {
                    "workflow": { "type": "text" },
                    "normalized_title": { "type": "text" },
                    "platform": { "type": "keyword" },
                    "country": { "type": "keyword" },
                    "score": { "type": "float" },
                    "last_seen": { "type": "date" }
                }
            }
        });

        let resp = self
            .client
            .put(index_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await
    }

    /// Index (or overwrite) one observation document.
    ///
    /// The document id is `<platform>-<source_id>`, so repeated observations
    /// of the same item overwrite a single document rather than piling up.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport failure or a non-2xx response.
    pub async fn index_observation(
        &self,
        observation: &CanonicalObservation,
    ) -> Result<(), SearchError> {
        let doc_id = format!("{}-{}", observation.platform, observation.source_id);
        let url = self.url(&format!("{INDEX_NAME}/_doc/{doc_id}"))?;

        // Views double as a crude relevance score until the ranking job runs.
        let score = observation
            .metrics
            .get("views")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);

        let doc = serde_json::json!({
            "workflow": observation.title,
            "normalized_title": observation.normalized_title,
            "platform": observation.platform,
            "country": observation.country,
            "score": score,
            "last_seen": observation.collected_at,
        });

        let resp = self
            .client
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&doc)
            .send()
            .await?;
        Self::check(resp).await
    }

    fn url(&self, path: &str) -> Result<Url, SearchError> {
        self.base_url
            .join(path)
            .map_err(|_| SearchError::InvalidUrl(self.base_url.to_string()))
    }

    async fn check(resp: reqwest::Response) -> Result<(), SearchError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SearchError::Rejected { status, body })
    }
}
