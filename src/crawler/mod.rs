//! Crawler module for catalog traversal and ingestion
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind a swappable trait (headless browser or plain HTTP)
//! - Enumeration of crawl coordinates and listing URLs
//! - Duplicate suppression across overlapping result sets
//! - Overall crawl orchestration

mod browser;
mod coordinator;
mod fetcher;
mod ledger;
mod traversal;

pub use browser::{BrowserPageFetcher, BrowserSettings};
pub use coordinator::{AssetOutcome, EnrichedCandidate, Orchestrator};
pub use fetcher::{
    build_http_client, build_page_fetcher, FetchError, HttpPageFetcher, PageFetcher, PageKind,
};
pub use ledger::DedupLedger;
pub use traversal::{plan, search_slots, CrawlCoordinate, SearchSlot};

use crate::config::Config;
use crate::output::CrawlStats;
use crate::HarvestError;

/// Runs a complete crawl with the collaborators named in the configuration
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the page fetcher, image store and dataset sink
/// 2. Walk every listing page in traversal order
/// 3. Enrich and persist every new event
///
/// # Example
///
/// ```no_run
/// use event_harvester::config::load_config;
/// use event_harvester::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = crawl(&config).await?;
/// println!("{} records written", stats.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<CrawlStats, HarvestError> {
    let mut orchestrator = Orchestrator::from_config(config).await?;
    let result = orchestrator.run().await;
    orchestrator.shutdown().await;
    result
}
