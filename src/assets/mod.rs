//! Thumbnail assets
//!
//! This module handles:
//! - Turning event text into safe, reproducible filenames
//! - Downloading thumbnails on a best-effort basis
//! - Durably writing them to an asset store

mod downloader;
mod sanitize;
mod store;

pub use downloader::AssetDownloader;
pub use sanitize::{sanitize_filename, thumbnail_filename, RESERVED_CHARS};
pub use store::{AssetError, AssetResult, AssetStore, FsAssetStore};
