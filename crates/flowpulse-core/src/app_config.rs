use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, sourced from environment variables once at
/// startup and passed down as a handle. See `config::load_app_config`.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,

    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,

    pub fetch_timeout_secs: u64,
    /// Additional attempts after the first, so 2 retries = 3 tries total.
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
    pub fetch_user_agent: String,

    pub youtube_api_key: Option<String>,
    pub youtube_query: String,
    pub youtube_region: String,
    pub youtube_page_size: u32,

    pub discourse_base_url: String,
    pub discourse_api_key: Option<String>,
    pub discourse_api_user: Option<String>,

    pub trends_base_url: String,
    pub keywords_path: Option<PathBuf>,

    pub search_mirror_enabled: bool,
    pub opensearch_url: String,
    pub opensearch_user: String,
    pub opensearch_password: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("youtube_query", &self.youtube_query)
            .field("youtube_region", &self.youtube_region)
            .field("youtube_page_size", &self.youtube_page_size)
            .field("discourse_base_url", &self.discourse_base_url)
            .field(
                "discourse_api_key",
                &self.discourse_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("discourse_api_user", &self.discourse_api_user)
            .field("trends_base_url", &self.trends_base_url)
            .field("keywords_path", &self.keywords_path)
            .field("search_mirror_enabled", &self.search_mirror_enabled)
            .field("opensearch_url", &self.opensearch_url)
            .field("opensearch_user", &self.opensearch_user)
            .field("opensearch_password", &"[redacted]")
            .finish()
    }
}
