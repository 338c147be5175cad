use crate::config::types::{Config, CrawlerConfig, Location};
use crate::extract::Selectors;
use crate::ConfigError;
use url::Url;

/// Upper bound for concurrently processed detail pages
const MAX_CONCURRENT_DETAILS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.page_count < 1 {
        return Err(ConfigError::Validation(format!(
            "page_count must be >= 1, got {}",
            config.page_count
        )));
    }

    validate_crawler_config(&config.crawler)?;
    validate_locations(&config.locations)?;

    for category in &config.categories {
        validate_slug("category", category)?;
    }

    if config.output.dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }

    if config.output.image_dir.is_empty() {
        return Err(ConfigError::Validation(
            "image_dir cannot be empty".to_string(),
        ));
    }

    Selectors::compile(&config.selectors)?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "https" && base.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.max_concurrent_details < 1 || config.max_concurrent_details > MAX_CONCURRENT_DETAILS
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_details must be between 1 and {}, got {}",
            MAX_CONCURRENT_DETAILS, config.max_concurrent_details
        )));
    }

    if matches!(config.browser_executable.as_deref(), Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "browser_executable cannot be empty when set".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request and connect timeouts must be at least one second".to_string(),
        ));
    }

    Ok(())
}

/// Validates location entries
fn validate_locations(locations: &[Location]) -> Result<(), ConfigError> {
    for location in locations {
        validate_slug("country", &location.country)?;
        for city in &location.cities {
            validate_slug("city", city)?;
        }
    }
    Ok(())
}

/// Validates a value that is spliced into a listing URL path
fn validate_slug(kind: &str, slug: &str) -> Result<(), ConfigError> {
    if slug.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", kind)));
    }

    if slug
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
    {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must not contain whitespace, '/', '?' or '#'",
            kind, slug
        )));
    }

    Ok(())
}
