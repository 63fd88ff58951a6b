//! Raw wire shapes for the third-party platform APIs.
//!
//! Fields the adapters do not read are omitted; unknown fields are ignored
//! by serde. Counts from the `YouTube` Data API arrive as strings and are
//! parsed leniently by the adapter.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// YouTube Data API v3
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct YtSearchResponse {
    #[serde(default)]
    pub items: Vec<YtSearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct YtSearchItem {
    #[serde(default)]
    pub id: YtSearchItemId,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct YtSearchItemId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct YtVideoListResponse {
    #[serde(default)]
    pub items: Vec<YtVideoItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct YtVideoItem {
    pub id: String,
    #[serde(default)]
    pub statistics: YtVideoStatistics,
    pub snippet: YtVideoSnippet,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct YtVideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct YtVideoSnippet {
    pub title: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Discourse /latest.json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct LatestTopicsResponse {
    #[serde(default)]
    pub topic_list: TopicList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TopicList {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Topic {
    pub id: Option<i64>,
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub like_count: u64,
    /// Includes the opening post; the adapter subtracts it to count replies.
    #[serde(default)]
    pub posts_count: u64,
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Google Trends interest-over-time (widgetdata/multiline)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct TrendsResponse {
    pub default: TrendsTimeline,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendsTimeline {
    #[serde(rename = "timelineData", default)]
    pub timeline_data: Vec<TrendsPoint>,
}

/// One sample; `value` holds one entry per requested keyword, in request
/// order (columnar layout).
#[derive(Debug, Deserialize)]
pub(crate) struct TrendsPoint {
    #[serde(default)]
    pub value: Vec<f64>,
}
