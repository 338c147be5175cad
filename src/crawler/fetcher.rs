//! Page fetching
//!
//! The orchestrator only ever talks to a [`PageFetcher`]. Two implementations
//! exist: [`BrowserPageFetcher`] renders pages in headless Chromium and lets
//! their scripts settle, and [`HttpPageFetcher`] returns the served HTML as is.
//! `[crawler] fetcher` picks one.

use crate::config::{Config, FetcherKind};
use crate::crawler::browser::{BrowserPageFetcher, BrowserSettings};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Which kind of page is being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A paginated search-results page
    Listing,
    /// An individual event page
    Detail,
}

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },
}

/// Returns rendered page content for a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its HTML once the page has settled
    async fn fetch(&self, url: &Url, kind: PageKind) -> Result<String, FetchError>;

    /// Releases anything the fetcher holds open
    async fn shutdown(&self) {}
}

/// Builds the page fetcher selected by `[crawler] fetcher`
///
/// The browser fetcher launches Chromium here, so a missing browser fails the
/// run before any page is requested.
pub async fn build_page_fetcher(
    config: &Config,
    client: Client,
) -> Result<Arc<dyn PageFetcher>, FetchError> {
    match config.crawler.fetcher {
        FetcherKind::Http => {
            tracing::info!("Fetching pages over plain HTTP");
            Ok(Arc::new(HttpPageFetcher::from_config(client, config)))
        }
        FetcherKind::Browser => {
            let fetcher = BrowserPageFetcher::launch(BrowserSettings::from_config(config)).await?;
            Ok(Arc::new(fetcher))
        }
    }
}

/// Builds the HTTP client shared by page fetches and thumbnail downloads
///
/// Every request is bounded by the configured request and connect timeouts.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true);

    if let Some(user_agent) = &config.user_agent.value {
        builder = builder.user_agent(user_agent.clone());
    }

    builder.build()
}

/// Fetches pages over plain HTTP
///
/// Nothing is rendered: the body comes back exactly as served, so content
/// that the catalog builds with scripts is missing. The configured settle
/// times are used as a request delay, a pause after each page before the
/// body is handed back.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    listing_delay: Duration,
    detail_delay: Duration,
}

impl HttpPageFetcher {
    pub fn new(client: Client, listing_delay: Duration, detail_delay: Duration) -> Self {
        Self {
            client,
            listing_delay,
            detail_delay,
        }
    }

    /// Creates a fetcher whose request delays are the configured settle times
    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            Duration::from_millis(config.crawler.listing_settle_ms),
            Duration::from_millis(config.crawler.detail_settle_ms),
        )
    }

    fn request_delay(&self, kind: PageKind) -> Duration {
        match kind {
            PageKind::Listing => self.listing_delay,
            PageKind::Detail => self.detail_delay,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url, kind: PageKind) -> Result<String, FetchError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source: e,
                }
            }
        };

        let response = self.client.get(url.clone()).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(classify)?;

        let delay = self.request_delay(kind);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpPageFetcher {
        let client = build_http_client(&Config::default()).unwrap();
        HttpPageFetcher::new(client, Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_build_http_client_with_user_agent() {
        let mut config = Config::default();
        config.user_agent.value = Some("EventHarvester/1.0".to_string());
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_request_delay_per_kind() {
        let client = build_http_client(&Config::default()).unwrap();
        let fetcher = HttpPageFetcher::from_config(client, &Config::default());
        assert_eq!(fetcher.request_delay(PageKind::Listing), Duration::from_millis(5000));
        assert_eq!(fetcher.request_delay(PageKind::Detail), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_build_page_fetcher_http() {
        let mut config = Config::default();
        config.crawler.fetcher = FetcherKind::Http;
        config.crawler.listing_settle_ms = 0;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/d/x"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>listing</p>"))
            .mount(&server)
            .await;

        let client = build_http_client(&config).unwrap();
        let fetcher = build_page_fetcher(&config, client).await.unwrap();
        let url = Url::parse(&format!("{}/d/x", server.uri())).unwrap();
        assert_eq!(
            fetcher.fetch(&url, PageKind::Listing).await.unwrap(),
            "<p>listing</p>"
        );
        fetcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_build_page_fetcher_browser_without_executable() {
        let mut config = Config::default();
        config.crawler.fetcher = FetcherKind::Browser;
        config.crawler.browser_executable = Some("/nonexistent/chromium".to_string());

        let client = build_http_client(&config).unwrap();
        let result = build_page_fetcher(&config, client).await;
        assert!(matches!(result, Err(FetchError::Launch(_))));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/e/event-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Event</h1>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/e/event-1", server.uri())).unwrap();
        let body = fetcher().fetch(&url, PageKind::Detail).await.unwrap();
        assert_eq!(body, "<h1>Event</h1>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/e/event-1", server.uri())).unwrap();
        let result = fetcher().fetch(&url, PageKind::Detail).await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let fetcher = HttpPageFetcher::new(client, Duration::ZERO, Duration::ZERO);

        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        let result = fetcher.fetch(&url, PageKind::Listing).await;
        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }
}
