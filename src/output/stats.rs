//! Run statistics
//!
//! Counters kept by the orchestrator while it crawls, and the summary printed
//! when the run ends.

use chrono::{DateTime, Utc};

/// Counters for a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Listing pages fetched successfully
    pub listing_pages: u64,

    /// Listing pages with no cards, each ending paging for its category
    pub empty_pages: u64,

    /// Listing pages that could not be fetched
    pub listing_failures: u64,

    /// Cards found across all listing pages
    pub candidates_seen: u64,

    /// Cards skipped because their link was already in the ledger
    pub duplicates_skipped: u64,

    /// Records appended to the dataset
    pub records_written: u64,

    /// Candidates dropped because fetching or extraction failed
    pub candidate_failures: u64,

    pub assets_saved: u64,
    pub asset_failures: u64,

    /// Records whose detail page published no thumbnail
    pub assets_missing: u64,

    /// Whether the run stopped early on an interrupt
    pub interrupted: bool,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listing_pages: 0,
            empty_pages: 0,
            listing_failures: 0,
            candidates_seen: 0,
            duplicates_skipped: 0,
            records_written: 0,
            candidate_failures: 0,
            assets_saved: 0,
            asset_failures: 0,
            assets_missing: 0,
            interrupted: false,
        }
    }

    /// Marks the run as finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration, if the run has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of processed candidates that produced a record, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.records_written + self.candidate_failures;
        if attempted == 0 {
            return 0.0;
        }
        (self.records_written as f64 / attempted as f64) * 100.0
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    if stats.interrupted {
        println!("  Stopped early: interrupted");
    }
    println!();

    println!("Listing Pages:");
    println!("  Fetched: {}", stats.listing_pages);
    println!("  Empty (end of results): {}", stats.empty_pages);
    println!("  Failed: {}", stats.listing_failures);
    println!();

    println!("Candidates:");
    println!("  Found: {}", stats.candidates_seen);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!("  Records written: {}", stats.records_written);
    println!("  Failed: {}", stats.candidate_failures);
    println!();

    println!("Thumbnails:");
    println!("  Saved: {}", stats.assets_saved);
    println!("  Failed: {}", stats.asset_failures);
    println!("  Not published: {}", stats.assets_missing);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} candidates written)",
        stats.success_rate(),
        stats.records_written,
        stats.records_written + stats.candidate_failures
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero() {
        let stats = CrawlStats::new();
        assert_eq!(stats.records_written, 0);
        assert_eq!(stats.finished_at, None);
        assert_eq!(stats.duration_seconds(), None);
    }

    #[test]
    fn test_success_rate() {
        let mut stats = CrawlStats::new();
        stats.records_written = 8;
        stats.candidate_failures = 2;
        assert!((stats.success_rate() - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_nothing_attempted() {
        assert_eq!(CrawlStats::new().success_rate(), 0.0);
    }

    #[test]
    fn test_finish_sets_duration() {
        let mut stats = CrawlStats::new();
        stats.finish();
        assert!(stats.duration_seconds().unwrap() >= 0);
    }
}
