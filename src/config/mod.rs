//! Configuration module for Event Harvester
//!
//! This module handles loading, parsing, and validating configuration files.
//! TOML is the native format; files ending in `.json` are read as JSON so the
//! legacy `{ "locations", "categories", "page_count" }` layout keeps working.
//!
//! # Example
//!
//! ```no_run
//! use event_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Pages per category: {}", config.page_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CollisionPolicy, Config, CrawlerConfig, FetcherKind, Location, OutputConfig, SelectorConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
