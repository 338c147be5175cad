//! The event record written to the dataset
//!
//! Every record carries all eleven fields. Anything extraction could not find is
//! stored as [`NOT_AVAILABLE`] rather than left out, so every dataset row has the
//! same shape as the header.

use crate::crawler::CrawlCoordinate;
use crate::extract::EventDetails;

/// Placeholder for a field that extraction could not resolve
pub const NOT_AVAILABLE: &str = "N/A";

/// Column names in write order
pub const FIELD_NAMES: [&str; 11] = [
    "event_name",
    "description",
    "date_time",
    "venue",
    "organizer",
    "min_ticket_price",
    "thumbnail_filename",
    "country",
    "city",
    "category",
    "page_number",
];

/// A fully composed event, ready to be appended to the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event_name: String,
    pub description: String,
    pub date_time: String,
    pub venue: String,
    pub organizer: String,
    pub min_ticket_price: String,
    pub thumbnail_filename: String,
    pub country: String,
    pub city: String,
    pub category: String,
    pub page_number: u32,
}

impl EventRecord {
    /// Composes a record from detail-page fields, the card's price, the
    /// thumbnail filename and the crawl coordinate it was found at
    pub fn compose(
        details: EventDetails,
        min_ticket_price: String,
        thumbnail_filename: String,
        coordinate: &CrawlCoordinate,
    ) -> Self {
        Self {
            event_name: details.event_name,
            description: details.description,
            date_time: details.date_time,
            venue: details.venue,
            organizer: details.organizer,
            min_ticket_price,
            thumbnail_filename,
            country: coordinate.country.clone(),
            city: coordinate.city.clone(),
            category: coordinate.category.clone(),
            page_number: coordinate.page_number,
        }
    }

    /// Column names, in the order [`EventRecord::values`] yields them
    pub fn field_names(&self) -> &'static [&'static str] {
        &FIELD_NAMES
    }

    /// Field values in column order
    pub fn values(&self) -> [String; 11] {
        [
            self.event_name.clone(),
            self.description.clone(),
            self.date_time.clone(),
            self.venue.clone(),
            self.organizer.clone(),
            self.min_ticket_price.clone(),
            self.thumbnail_filename.clone(),
            self.country.clone(),
            self.city.clone(),
            self.category.clone(),
            self.page_number.to_string(),
        ]
    }
}
