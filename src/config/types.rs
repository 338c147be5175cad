use serde::Deserialize;

/// Main configuration structure for Event Harvester
///
/// Only `locations`, `categories` and `page_count` describe the search space;
/// every other section is optional and falls back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locations: Vec<Location>,

    #[serde(default)]
    pub categories: Vec<String>,

    /// Number of listing pages to visit per (city, category) pair
    #[serde(default = "default_page_count", alias = "page-count")]
    pub page_count: u32,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default, rename = "user-agent", alias = "user_agent")]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            categories: Vec::new(),
            page_count: default_page_count(),
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

/// A country and the cities within it to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    /// Country slug as it appears in listing URLs (e.g. "united-kingdom")
    pub country: String,

    /// City slugs within the country
    #[serde(default)]
    pub cities: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Catalog root that listing URLs are built from
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// How pages are loaded
    #[serde(default)]
    pub fetcher: FetcherKind,

    /// Chromium binary for the browser fetcher; searched for when unset
    #[serde(default)]
    pub browser_executable: Option<String>,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Time to let a listing page's scripts settle after navigation
    /// (milliseconds). The HTTP fetcher pauses this long after each request.
    #[serde(default = "default_listing_settle_ms")]
    pub listing_settle_ms: u64,

    /// Same as `listing_settle_ms`, for detail pages
    #[serde(default = "default_detail_settle_ms")]
    pub detail_settle_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Detail pages processed at once; 1 keeps the crawl strictly sequential
    #[serde(default = "default_max_concurrent_details")]
    pub max_concurrent_details: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetcher: FetcherKind::default(),
            browser_executable: None,
            headless: default_headless(),
            listing_settle_ms: default_listing_settle_ms(),
            detail_settle_ms: default_detail_settle_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_concurrent_details: default_max_concurrent_details(),
        }
    }
}

/// Page fetcher implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Render pages in headless Chromium
    #[default]
    Browser,
    /// Plain HTTP GET, no script execution
    Http,
}

/// User agent identification configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAgentConfig {
    /// Full User-Agent header value; reqwest's default is used when unset
    pub value: Option<String>,
}

/// What to do when an asset file with the same name already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Last write wins
    #[default]
    Overwrite,
    /// Keep the existing file and report the new write as failed
    Reject,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the CSV dataset that records are appended to
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Directory thumbnails are written into
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    #[serde(default)]
    pub on_collision: CollisionPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            image_dir: default_image_dir(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

/// CSS selectors used to pull fields out of listing and detail pages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorConfig {
    pub event_card: String,
    pub card_price: String,
    pub card_link: String,
    pub event_name: String,
    pub date_time: String,
    pub description: String,
    pub venue: String,
    pub organizer: String,
    pub thumbnail: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            event_card: "div.event-card".to_string(),
            card_price: "div.DiscoverHorizontalEventCard-module__priceWrapper___3rOUY"
                .to_string(),
            card_link: "a".to_string(),
            event_name: "h1".to_string(),
            date_time: "span.date-info__full-datetime".to_string(),
            description: "div.has-user-generated-content.event-description".to_string(),
            venue: "div.location-info__address".to_string(),
            organizer: "div.descriptive-organizer-info-mobile__name".to_string(),
            thumbnail: r#"meta[property="og:image"]"#.to_string(),
        }
    }
}

fn default_page_count() -> u32 {
    1
}

fn default_base_url() -> String {
    "https://www.eventbrite.com".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_listing_settle_ms() -> u64 {
    5000
}

fn default_detail_settle_ms() -> u64 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_details() -> usize {
    1
}

fn default_dataset_path() -> String {
    "eventbrite_data.csv".to_string()
}

fn default_image_dir() -> String {
    "eventbrite_images".to_string()
}
