//! Headless-browser page fetching
//!
//! Catalog pages build their event cards and detail sections with scripts, so
//! the served HTML alone is not enough. [`BrowserPageFetcher`] loads every page
//! in Chromium, waits for navigation, lets the page settle for its kind's
//! settle time, and returns the rendered DOM.

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, PageFetcher, PageKind};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

/// How long Chromium gets to start and open its DevTools connection
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Launch and pacing settings for [`BrowserPageFetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// Chromium binary; chromiumoxide looks in the usual places when unset
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub user_agent: Option<String>,
    /// Upper bound for loading one page, settle time excluded
    pub page_timeout: Duration,
    pub listing_settle: Duration,
    pub detail_settle: Duration,
}

impl BrowserSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            executable: config.crawler.browser_executable.as_ref().map(PathBuf::from),
            headless: config.crawler.headless,
            user_agent: config.user_agent.value.clone(),
            page_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            listing_settle: Duration::from_millis(config.crawler.listing_settle_ms),
            detail_settle: Duration::from_millis(config.crawler.detail_settle_ms),
        }
    }

    fn settle_time(&self, kind: PageKind) -> Duration {
        match kind {
            PageKind::Listing => self.listing_settle,
            PageKind::Detail => self.detail_settle,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder().request_timeout(self.page_timeout);

        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }

        builder = if self.headless {
            builder.headless_mode(HeadlessMode::default())
        } else {
            builder.with_head()
        };

        if let Some(user_agent) = &self.user_agent {
            builder = builder.arg(format!("--user-agent={}", user_agent));
        }

        builder
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--mute-audio")
            .build()
            .map_err(FetchError::Launch)
    }
}

/// Fetches pages by rendering them in a shared Chromium instance
///
/// Each fetch opens its own tab and closes it afterwards, so concurrent
/// detail fetches do not interfere.
pub struct BrowserPageFetcher {
    /// Taken out on shutdown
    browser: Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
    settings: BrowserSettings,
}

impl BrowserPageFetcher {
    /// Launches Chromium and starts driving its DevTools event stream
    pub async fn launch(settings: BrowserSettings) -> Result<Self, FetchError> {
        let browser_config = settings.browser_config()?;

        tracing::info!(
            "Launching {} browser",
            if settings.headless { "headless" } else { "windowed" }
        );
        let (browser, mut handler) =
            match tokio::time::timeout(LAUNCH_TIMEOUT, Browser::launch(browser_config)).await {
                Ok(Ok(launched)) => launched,
                Ok(Err(e)) => return Err(FetchError::Launch(e.to_string())),
                Err(_) => {
                    return Err(FetchError::Launch(format!(
                        "browser did not start within {}s",
                        LAUNCH_TIMEOUT.as_secs()
                    )))
                }
            };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Includes CDP events chromiumoxide cannot decode
                    tracing::trace!("Browser handler error: {}", e);
                }
            }
            tracing::debug!("Browser handler task completed");
        });

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler,
            settings,
        })
    }

    async fn open_tab(&self, url: &Url) -> Result<Page, FetchError> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().ok_or_else(|| FetchError::Browser {
            url: url.to_string(),
            message: "browser already shut down".to_string(),
        })?;

        browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error(url, e))
    }
}

/// Navigates, waits for the load, lets scripts settle, and reads the DOM
async fn render(page: &Page, url: &Url, settle: Duration) -> Result<String, CdpError> {
    page.goto(url.as_str()).await?;
    page.wait_for_navigation().await?;

    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    page.content().await
}

fn browser_error(url: &Url, e: CdpError) -> FetchError {
    match e {
        CdpError::Timeout => FetchError::Timeout {
            url: url.to_string(),
        },
        other => FetchError::Browser {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl PageFetcher for BrowserPageFetcher {
    async fn fetch(&self, url: &Url, kind: PageKind) -> Result<String, FetchError> {
        let page = self.open_tab(url).await?;

        let settle = self.settings.settle_time(kind);
        let limit = self.settings.page_timeout + settle;
        let result = match tokio::time::timeout(limit, render(&page, url, settle)).await {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => Err(browser_error(url, e)),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        };

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }

        result
    }

    async fn shutdown(&self) {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!("Failed waiting for browser exit: {}", e);
            }
            tracing::info!("Browser closed");
        }
        self.handler.abort();
    }
}
