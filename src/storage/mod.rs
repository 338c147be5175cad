//! Storage module for persisting event records
//!
//! This module handles durable, incremental dataset writes:
//! - Creating the dataset with a header on the first record
//! - Appending one complete row per record
//! - Discarding a row torn by an earlier crash before appending again

mod csv_sink;
mod traits;

pub use csv_sink::{count_rows, CsvRecordSink};
pub use traits::{RecordSink, SinkError, SinkResult};

use std::path::Path;

/// Removes an existing dataset so the next run starts from an empty file
///
/// # Returns
///
/// * `Ok(true)` - A dataset was removed
/// * `Ok(false)` - There was nothing to remove
pub fn remove_dataset(path: &Path) -> SinkResult<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SinkError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}
