//! Trend-keyword list, optionally overridden by a YAML file.

use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Keywords tracked by the search-trends adapter when no file is configured.
#[must_use]
pub fn default_trend_keywords() -> Vec<String> {
    vec![
        "n8n workflow".to_string(),
        "n8n automation".to_string(),
        "n8n tutorial".to_string(),
    ]
}

#[derive(Debug, Deserialize)]
pub struct KeywordsFile {
    pub keywords: Vec<String>,
}

/// Load the trend-keyword list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or if the
/// list is empty or contains a blank keyword.
pub fn load_trend_keywords(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KeywordsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: KeywordsFile = serde_yaml::from_str(&content)?;

    if file.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keywords file must list at least one keyword".to_string(),
        ));
    }
    for kw in &file.keywords {
        if kw.trim().is_empty() {
            return Err(ConfigError::Validation(
                "keywords must be non-empty".to_string(),
            ));
        }
    }

    Ok(file.keywords)
}
