//! Pure title canonicalization and engagement-ratio derivation.
//!
//! These functions never fail and take no dependencies beyond the regex for
//! duration stripping; every adapter and the import path funnel through them
//! so stored `normalized_title` values are comparable across platforms.

use std::sync::LazyLock;

use regex::Regex;

use crate::observation::Metrics;

/// Matches `MM:SS`-shaped duration fragments that leak into video titles.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}").expect("duration regex is valid"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Canonicalizes a display title for fuzzy matching and search.
///
/// Lowercases, strips embedded `MM:SS` duration fragments, collapses
/// whitespace runs to a single space, and trims. Durations are stripped
/// before whitespace is collapsed so the result is a fixed point:
/// `normalize_title(normalize_title(t)) == normalize_title(t)`.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let without_durations = DURATION_RE.replace_all(&lowered, "");
    let collapsed = WHITESPACE_RE.replace_all(&without_durations, " ");
    collapsed.trim().to_string()
}

/// Derives the common engagement metrics mapping from raw counters.
///
/// Returns `views`, `likes`, `comments` plus `like_to_view_ratio` and
/// `comment_to_view_ratio`, each ratio rounded to 6 decimal places. Both
/// ratios are defined as 0 when `views` is 0 — zero division is a guarded
/// case, not an error. Ratios are not clamped: an upstream anomaly with
/// more likes than views produces a ratio above 1, preserved as observed.
#[must_use]
pub fn compute_ratios(views: u64, likes: u64, comments: u64) -> Metrics {
    let like_ratio = ratio(likes, views);
    let comment_ratio = ratio(comments, views);

    let mut metrics = Metrics::new();
    metrics.insert("views".to_string(), serde_json::json!(views));
    metrics.insert("likes".to_string(), serde_json::json!(likes));
    metrics.insert("comments".to_string(), serde_json::json!(comments));
    metrics.insert(
        "like_to_view_ratio".to_string(),
        serde_json::json!(like_ratio),
    );
    metrics.insert(
        "comment_to_view_ratio".to_string(),
        serde_json::json!(comment_ratio),
    );
    metrics
}

#[allow(clippy::cast_precision_loss)] // counters are far below 2^52
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round6(numerator as f64 / denominator as f64)
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
