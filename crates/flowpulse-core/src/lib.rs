//! Shared types and configuration for the flowpulse workspace.
//!
//! Holds the canonical observation shape produced by every fetch adapter,
//! the pure title/metrics normalization functions, and the env-driven
//! application configuration. No I/O beyond reading config files.

mod app_config;
mod config;
mod keywords;
mod normalize;
mod observation;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use keywords::{default_trend_keywords, load_trend_keywords, KeywordsFile};
pub use normalize::{compute_ratios, normalize_title};
pub use observation::{CanonicalObservation, Metrics};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read keywords file {path}: {source}")]
    KeywordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keywords file: {0}")]
    KeywordsFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
