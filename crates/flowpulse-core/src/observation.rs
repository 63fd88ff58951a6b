use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open-ended mapping of named numeric measurements for one item.
///
/// Platforms contribute different key sets: every platform supplies `views`,
/// `likes`, `comments` and the two derived ratios, while the trends adapter
/// adds `trend_score`. Deliberately not a rigid struct.
pub type Metrics = serde_json::Map<String, serde_json::Value>;

/// One platform's normalized report of a single item's popularity signals
/// at a point in time. Produced by a fetch adapter, consumed by the upsert
/// engine and the import endpoint.
///
/// Serialized field names follow the canonical wire shape: the display title
/// travels as `workflow` and the metrics mapping as `popularity_metrics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalObservation {
    /// Source system, e.g. `"YouTube"`, `"Discourse"`, `"GoogleTrends"`.
    pub platform: String,
    /// Platform-unique identifier of the observed item. Adapters skip items
    /// without a usable id rather than fabricating one.
    pub source_id: String,
    pub source_url: Option<String>,
    /// Human-readable title of the workflow/video/topic/keyword.
    #[serde(rename = "workflow")]
    pub title: String,
    pub normalized_title: String,
    /// Region code, or `"Global"` for region-less platforms.
    pub country: String,
    #[serde(rename = "popularity_metrics")]
    pub metrics: Metrics,
    /// Observation timestamp; `None` falls back to the server-assigned now
    /// at insert time.
    pub collected_at: Option<DateTime<Utc>>,
}
