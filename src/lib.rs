//! Event Harvester: an incremental event-catalog crawler
//!
//! This crate walks a paginated event catalog over a (location × category × page)
//! search space, enriches every newly discovered listing with its detail page and
//! thumbnail image, and appends each finished record to a dataset as soon as it
//! is composed, so an interrupted run keeps everything written so far.

pub mod assets;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for Event Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Asset error: {0}")]
    Asset(#[from] assets::AssetError),

    #[error("Dataset error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid link '{link}' on {page}")]
    InvalidLink { link: String, page: String },
}

impl HarvestError {
    /// Returns true for failures after which no further progress can be recorded.
    ///
    /// Everything else is local to one candidate or one asset and is absorbed
    /// by the orchestrator.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Sink(_) | Self::Config(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for '{field}': {selector}")]
    InvalidSelector { field: String, selector: String },
}

/// Result type alias for Event Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlCoordinate, DedupLedger, Orchestrator, PageFetcher};
pub use record::EventRecord;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_sink_and_config_errors_are_fatal() {
        let sink = HarvestError::Sink(storage::SinkError::Io {
            path: "events.csv".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert!(sink.is_fatal());

        let config = HarvestError::from(ConfigError::Validation("page_count".to_string()));
        assert!(config.is_fatal());

        let link = HarvestError::InvalidLink {
            link: "::".to_string(),
            page: "london (united-kingdom) 'business' page 1".to_string(),
        };
        assert!(!link.is_fatal());

        let fetch = HarvestError::from(crawler::FetchError::Timeout {
            url: "https://catalog.test/e/1".to_string(),
        });
        assert!(!fetch.is_fatal());
    }
}
