//! Deduplication ledger

use crate::extract::EventReference;
use std::collections::HashSet;

/// Links already selected for processing during this run
///
/// Grows monotonically and lives only as long as the crawl. A link is marked
/// the moment it is picked, not when processing succeeds, so an event that
/// fails is not retried later in the same run.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a reference as seen
    ///
    /// Returns true if the reference was new and should be processed, false if
    /// it had already been seen.
    pub fn mark_new(&mut self, reference: &EventReference) -> bool {
        self.seen.insert(reference.link.clone())
    }

    pub fn contains(&self, reference: &EventReference) -> bool {
        self.seen.contains(&reference.link)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
