//! Output module for run reporting
//!
//! This module handles:
//! - Recording crawl statistics as the run progresses
//! - Printing the end-of-run summary

pub mod stats;

pub use stats::{print_statistics, CrawlStats};
