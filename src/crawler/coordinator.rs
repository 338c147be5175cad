//! Crawl orchestrator - main crawl loop
//!
//! This module drives the whole crawl:
//! - Walking listing pages in traversal order
//! - Stopping a category's paging at the first empty page
//! - Gating candidates through the dedup ledger before any detail fetch
//! - Enriching each new candidate with its detail page and thumbnail
//! - Appending each finished record to the dataset as soon as it exists
//!
//! A failure while handling one candidate is logged and the crawl moves on.
//! Only a dataset write failure stops the run.

use crate::assets::{thumbnail_filename, AssetDownloader, FsAssetStore};
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, build_page_fetcher, PageFetcher, PageKind};
use crate::crawler::ledger::DedupLedger;
use crate::crawler::traversal::{search_slots, CrawlCoordinate, SearchSlot};
use crate::extract::{extract_details, extract_listing, ListingCandidate, Selectors};
use crate::output::CrawlStats;
use crate::record::EventRecord;
use crate::storage::{CsvRecordSink, RecordSink};
use crate::HarvestError;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use url::Url;

/// What happened to a candidate's thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    Saved,
    Failed,
    /// The detail page published no thumbnail
    Missing,
}

/// A composed record, ready to persist
#[derive(Debug, Clone)]
pub struct EnrichedCandidate {
    pub record: EventRecord,
    pub asset: AssetOutcome,
}

/// Whether paging should continue for the current search slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Continue,
    /// No more results for this slot
    Exhausted,
    Cancelled,
}

/// Everything a candidate needs while it is being enriched
struct CandidateContext<'a> {
    fetcher: &'a dyn PageFetcher,
    downloader: &'a AssetDownloader,
    selectors: &'a Selectors,
}

/// Drives the crawl over the configured search space
pub struct Orchestrator {
    base_url: Url,
    slots: Vec<SearchSlot>,
    page_count: u32,
    max_concurrent_details: usize,
    selectors: Selectors,
    fetcher: Arc<dyn PageFetcher>,
    downloader: AssetDownloader,
    sink: Box<dyn RecordSink>,
    ledger: DedupLedger,
    stats: CrawlStats,
    cancelled: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Creates an orchestrator from its collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - Search space, selectors and concurrency settings
    /// * `fetcher` - Source of listing and detail pages
    /// * `downloader` - Best-effort thumbnail downloader
    /// * `sink` - Destination for finished records
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(HarvestError)` - The base URL or a selector is invalid
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        downloader: AssetDownloader,
        sink: Box<dyn RecordSink>,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            base_url: Url::parse(&config.crawler.base_url)?,
            slots: search_slots(config),
            page_count: config.page_count,
            max_concurrent_details: config.crawler.max_concurrent_details.max(1),
            selectors: Selectors::compile(&config.selectors)?,
            fetcher,
            downloader,
            sink,
            ledger: DedupLedger::new(),
            stats: CrawlStats::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Creates an orchestrator wired to the page fetcher chosen in the
    /// configuration, the image directory and the CSV dataset
    ///
    /// With the browser fetcher this launches Chromium; call
    /// [`Orchestrator::shutdown`] once the crawl is over.
    pub async fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        let store = FsAssetStore::new(&config.output.image_dir, config.output.on_collision)?;
        let downloader = AssetDownloader::new(client.clone(), Arc::new(store));
        let sink = CsvRecordSink::new(&config.output.dataset_path);
        let fetcher = build_page_fetcher(config, client).await?;

        Self::new(config, fetcher, downloader, Box::new(sink))
    }

    /// Releases the page fetcher's resources (the browser process, if any)
    pub async fn shutdown(&self) {
        self.fetcher.shutdown().await;
    }

    /// Flag that stops the crawl when set
    ///
    /// The crawl checks it between candidates and between pages. A record that
    /// has already been composed is still appended; nothing partial is written.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The crawl finished (or was cancelled cleanly)
    /// * `Err(HarvestError)` - A record could not be persisted
    pub async fn run(&mut self) -> Result<CrawlStats, HarvestError> {
        tracing::info!(
            "Starting crawl: {} search slots x {} pages",
            self.slots.len(),
            self.page_count
        );

        let slots = std::mem::take(&mut self.slots);
        'slots: for slot in &slots {
            for page_number in 1..=self.page_count {
                if self.is_cancelled() {
                    break 'slots;
                }

                let coordinate = slot.at_page(page_number);
                match self.crawl_page(&coordinate).await? {
                    PageOutcome::Continue => {}
                    PageOutcome::Exhausted => break,
                    PageOutcome::Cancelled => break 'slots,
                }
            }
        }
        self.slots = slots;

        if self.is_cancelled() {
            tracing::warn!("Crawl interrupted; dataset holds every record completed so far");
            self.stats.interrupted = true;
        }

        self.stats.finish();
        tracing::info!(
            "Crawl finished: {} records written, {} duplicates skipped, {} failures",
            self.stats.records_written,
            self.stats.duplicates_skipped,
            self.stats.candidate_failures
        );

        Ok(self.stats.clone())
    }

    /// Fetches one listing page and processes every new candidate on it
    async fn crawl_page(&mut self, coordinate: &CrawlCoordinate) -> Result<PageOutcome, HarvestError> {
        let url = coordinate.listing_url(&self.base_url)?;
        tracing::info!("Scraping URL: {}", url);

        let html = match self.fetcher.fetch(&url, PageKind::Listing).await {
            Ok(html) => html,
            Err(e) => {
                // Nothing on this page can be reached; treat it as the end of
                // the results for this category.
                tracing::warn!("Failed to fetch listing page {}: {}", url, e);
                self.stats.listing_failures += 1;
                return Ok(PageOutcome::Exhausted);
            }
        };
        self.stats.listing_pages += 1;

        let candidates = extract_listing(&html, &url, &self.selectors);
        tracing::info!(
            "Found {} event cards on page {} for {} ({}) in category '{}'",
            candidates.len(),
            coordinate.page_number,
            coordinate.city,
            coordinate.country,
            coordinate.category
        );

        if candidates.is_empty() {
            tracing::info!("No events found on this page, moving to next URL");
            self.stats.empty_pages += 1;
            return Ok(PageOutcome::Exhausted);
        }

        self.stats.candidates_seen += candidates.len() as u64;

        let mut fresh = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.ledger.mark_new(&candidate.reference) {
                fresh.push(candidate);
            } else {
                tracing::debug!("Skipping duplicate event {}", candidate.reference.link);
                self.stats.duplicates_skipped += 1;
            }
        }

        let ctx = CandidateContext {
            fetcher: self.fetcher.as_ref(),
            downloader: &self.downloader,
            selectors: &self.selectors,
        };

        // `buffered` yields results in input order, so records are appended in
        // listing order whatever the concurrency.
        let mut results = stream::iter(fresh)
            .map(|candidate| {
                let ctx = &ctx;
                async move {
                    let link = candidate.reference.link.clone();
                    (link, enrich_candidate(ctx, candidate, coordinate).await)
                }
            })
            .buffered(self.max_concurrent_details);

        while let Some((link, result)) = results.next().await {
            match result {
                Ok(enriched) => {
                    let sink = &mut self.sink;
                    run_blocking(|| sink.append(&enriched.record))?;
                    tracing::info!("Appended event: {}", enriched.record.event_name);

                    self.stats.records_written += 1;
                    match enriched.asset {
                        AssetOutcome::Saved => self.stats.assets_saved += 1,
                        AssetOutcome::Failed => self.stats.asset_failures += 1,
                        AssetOutcome::Missing => self.stats.assets_missing += 1,
                    }
                }
                Err(e) => {
                    tracing::warn!("Error processing event {}: {}", link, e);
                    self.stats.candidate_failures += 1;
                }
            }

            if self.cancelled.load(Ordering::SeqCst) {
                return Ok(PageOutcome::Cancelled);
            }
        }

        Ok(PageOutcome::Continue)
    }
}

/// Runs blocking dataset I/O, handing this worker's other tasks to another
/// thread first when the runtime has more than one
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

/// Fetches a candidate's detail page, captures its thumbnail, and composes
/// the record
///
/// The thumbnail is best effort: a failed or missing image still yields a
/// record that names the computed filename.
async fn enrich_candidate(
    ctx: &CandidateContext<'_>,
    candidate: ListingCandidate,
    coordinate: &CrawlCoordinate,
) -> Result<EnrichedCandidate, HarvestError> {
    let ListingCandidate {
        reference,
        summary_price,
    } = candidate;

    let detail_url = Url::parse(&reference.link).map_err(|_| HarvestError::InvalidLink {
        link: reference.link.clone(),
        page: coordinate.to_string(),
    })?;

    let html = ctx.fetcher.fetch(&detail_url, PageKind::Detail).await?;
    let details = extract_details(&html, ctx.selectors);

    let filename = thumbnail_filename(&details.date_time, &details.event_name);

    let asset = match details.thumbnail_url.as_deref() {
        Some(raw) => match detail_url.join(raw) {
            Ok(image_url) => match ctx.downloader.download(image_url.as_str(), &filename).await {
                Ok(_) => AssetOutcome::Saved,
                Err(e) => {
                    tracing::warn!("Failed to download image {}: {}", image_url, e);
                    AssetOutcome::Failed
                }
            },
            Err(e) => {
                tracing::warn!("Bad thumbnail URL '{}' on {}: {}", raw, detail_url, e);
                AssetOutcome::Failed
            }
        },
        None => {
            tracing::info!("Thumbnail URL not found for {}", detail_url);
            AssetOutcome::Missing
        }
    };

    let record = EventRecord::compose(details, summary_price, filename, coordinate);
    Ok(EnrichedCandidate { record, asset })
}
