//! Listing page extraction
//!
//! Turns a rendered search-results page into the ordered list of event cards
//! it shows. Document order is kept: it decides which duplicate wins and the
//! order records land in the dataset.

use crate::extract::selectors::{stripped_text, Selectors};
use crate::record::NOT_AVAILABLE;
use scraper::Html;
use url::Url;

/// Identity of a listed event
///
/// Two references with the same link are the same event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventReference {
    /// Absolute URL of the event's detail page
    pub link: String,
}

/// An event card found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCandidate {
    pub reference: EventReference,

    /// Price shown on the card, or "N/A" when the card has none
    pub summary_price: String,
}

/// Extracts the event cards from a listing page
///
/// # Arguments
///
/// * `html` - Rendered listing page
/// * `page_url` - URL the page was fetched from, for resolving relative links
/// * `selectors` - Compiled selectors
///
/// # Returns
///
/// Candidates in document order. Cards without a usable link are skipped.
pub fn extract_listing(html: &str, page_url: &Url, selectors: &Selectors) -> Vec<ListingCandidate> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for card in document.select(&selectors.event_card) {
        let href = card
            .select(&selectors.card_link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        let Some(href) = href else {
            tracing::debug!("Skipping event card without a link on {}", page_url);
            continue;
        };

        let link = match page_url.join(href) {
            Ok(link) => link,
            Err(e) => {
                tracing::debug!("Skipping event card with bad link '{}': {}", href, e);
                continue;
            }
        };

        let summary_price = card
            .select(&selectors.card_price)
            .next()
            .map(stripped_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        candidates.push(ListingCandidate {
            reference: EventReference {
                link: link.to_string(),
            },
            summary_price,
        });
    }

    candidates
}
