//! Detail page extraction
//!
//! Every field is looked up on its own. A field whose element is missing
//! becomes "N/A"; nothing here can fail the record.

use crate::extract::selectors::{stripped_text, Selectors};
use crate::record::NOT_AVAILABLE;
use scraper::{ElementRef, Html, Selector};

const ORGANIZER_PREFIX: &str = "Organized by";

/// Fields read from an event's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub event_name: String,
    pub date_time: String,

    /// Space-joined paragraph texts; empty when the container has no paragraphs
    pub description: String,
    pub venue: String,
    pub organizer: String,

    /// Thumbnail URL exactly as published in the page metadata
    pub thumbnail_url: Option<String>,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            event_name: NOT_AVAILABLE.to_string(),
            date_time: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            venue: NOT_AVAILABLE.to_string(),
            organizer: NOT_AVAILABLE.to_string(),
            thumbnail_url: None,
        }
    }
}

/// Extracts event fields from a detail page
pub fn extract_details(html: &str, selectors: &Selectors) -> EventDetails {
    let document = Html::parse_document(html);

    let event_name = first(&document, &selectors.event_name)
        .map(stripped_text)
        .unwrap_or_else(not_available);

    let date_time = first(&document, &selectors.date_time)
        .map(stripped_text)
        .unwrap_or_else(not_available);

    let description = first(&document, &selectors.description)
        .map(|container| {
            container
                .select(&selectors.paragraph)
                .map(stripped_text)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_else(not_available);

    let venue = first(&document, &selectors.venue)
        .and_then(|container| first_inner(container, &selectors.paragraph))
        .map(stripped_text)
        .unwrap_or_else(not_available);

    let organizer = first(&document, &selectors.organizer)
        .and_then(|container| first_inner(container, &selectors.anchor))
        .map(|a| strip_organizer_prefix(&stripped_text(a)))
        .unwrap_or_else(not_available);

    let thumbnail_url = first(&document, &selectors.thumbnail)
        .and_then(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string);

    EventDetails {
        event_name,
        date_time,
        description,
        venue,
        organizer,
        thumbnail_url,
    }
}

fn first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

fn first_inner<'a>(container: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    container.select(selector).next()
}

fn strip_organizer_prefix(text: &str) -> String {
    let text = text.trim();
    text.strip_prefix(ORGANIZER_PREFIX)
        .unwrap_or(text)
        .trim()
        .to_string()
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}
