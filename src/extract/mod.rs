//! Page extraction
//!
//! Pure functions from rendered HTML to typed data:
//! - Listing pages yield ordered event candidates
//! - Detail pages yield event fields, defaulted when absent
//!
//! Parsed documents never leave these functions, so callers can hold the
//! results across `.await` points.

mod detail;
mod listing;
mod selectors;

pub use detail::{extract_details, EventDetails};
pub use listing::{extract_listing, EventReference, ListingCandidate};
pub use selectors::Selectors;
