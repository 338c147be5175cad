//! Record sink trait and error types

use crate::record::EventRecord;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while persisting records
///
/// Any of these means no further progress can be durably recorded, so the
/// crawl stops on the first one.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error on dataset {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error on dataset {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("Dataset {path} has header {found:?}, expected {expected:?}")]
    HeaderMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for completed records
///
/// Appends are complete and durable one record at a time: after `append`
/// returns `Ok`, that row survives a crash, and a crash during `append` never
/// leaves a partial row behind.
pub trait RecordSink: Send {
    /// Appends one record, creating the dataset with a header if needed
    fn append(&mut self, record: &EventRecord) -> SinkResult<()>;

    /// Where the dataset lives, for operator-facing messages
    fn location(&self) -> &Path;
}
