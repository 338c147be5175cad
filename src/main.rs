//! Event Harvester main entry point
//!
//! This is the command-line interface for the Event Harvester crawler.

use anyhow::Context;
use clap::Parser;
use event_harvester::config::{load_config_with_hash, Config};
use event_harvester::crawler::{plan, Orchestrator};
use event_harvester::output::print_statistics;
use event_harvester::storage::{count_rows, remove_dataset};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Event Harvester: an incremental event-catalog crawler
///
/// Walks every (location, city, category, page) listing in the configuration,
/// follows each new event to its detail page, saves its thumbnail, and appends
/// one row per event to the dataset as it goes.
#[derive(Parser, Debug)]
#[command(name = "event-harvester")]
#[command(version)]
#[command(about = "An incremental event-catalog crawler", long_about = None)]
struct Cli {
    /// Path to the TOML (or legacy JSON) configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Delete the existing dataset before crawling
    #[arg(long)]
    fresh: bool,

    /// Validate config and list the listing pages that would be visited
    #[arg(long, conflicts_with = "fresh")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Configuration problems are fatal before any crawling starts
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config, cli.fresh).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("event_harvester=info,warn"),
            1 => EnvFilter::new("event_harvester=debug,info"),
            2 => EnvFilter::new("event_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the traversal plan without fetching
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let base = url::Url::parse(&config.crawler.base_url)?;

    println!("=== Event Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Page fetcher: {:?}", config.crawler.fetcher);
    println!("  Pages per category: {}", config.page_count);
    println!(
        "  Settle time: listing {}ms, detail {}ms",
        config.crawler.listing_settle_ms, config.crawler.detail_settle_ms
    );
    println!(
        "  Concurrent detail pages: {}",
        config.crawler.max_concurrent_details
    );

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.dataset_path);
    println!("  Images: {}", config.output.image_dir);
    println!("  On name collision: {:?}", config.output.on_collision);

    println!("\nListing pages (at most):");
    let mut total = 0usize;
    for coordinate in plan(config) {
        match coordinate.listing_url(&base) {
            Ok(url) => println!("  {}", url),
            Err(e) => println!("  {} (invalid URL: {})", coordinate, e),
        }
        total += 1;
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would visit up to {} listing pages", total);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    let dataset = Path::new(&config.output.dataset_path);

    if fresh && remove_dataset(dataset)? {
        tracing::info!("Removed existing dataset {} for a fresh start", dataset.display());
    }

    tracing::info!(
        "Locations: {}, Categories: {}, Pages per category: {}",
        config.locations.len(),
        config.categories.len(),
        config.page_count
    );

    let mut orchestrator = Orchestrator::from_config(&config)
        .await
        .context("failed to set up the crawler")?;

    // Ctrl-C lets the record in flight finish, then stops
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current record");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let result = orchestrator.run().await;
    orchestrator.shutdown().await;

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).context(format!(
                "crawl stopped; rows already in {} are kept",
                dataset.display()
            ));
        }
    };

    print_statistics(&stats);

    if dataset.exists() {
        let rows = count_rows(dataset)?;
        println!("\nDataset now holds {} rows", rows);
    }
    println!(
        "Data extraction completed and saved incrementally to {}",
        dataset.display()
    );

    Ok(())
}
