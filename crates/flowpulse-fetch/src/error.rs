use thiserror::Error;

/// Errors returned by the platform fetch adapters.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client, including
    /// non-2xx statuses surfaced via `error_for_status`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The adapter's base URL could not be parsed.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
