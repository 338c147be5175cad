//! Traversal of the search space
//!
//! Coordinates are enumerated outer to inner: location, city, category, then
//! page number. Nothing here is stored; the whole plan follows from the
//! configuration.

use crate::config::Config;
use std::fmt;
use url::Url;

/// One (country, city, category) combination whose pages are walked in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSlot {
    pub country: String,
    pub city: String,
    pub category: String,
}

impl SearchSlot {
    /// The coordinate of a page within this slot
    pub fn at_page(&self, page_number: u32) -> CrawlCoordinate {
        CrawlCoordinate {
            country: self.country.clone(),
            city: self.city.clone(),
            category: self.category.clone(),
            page_number,
        }
    }
}

/// Position of a listing page in the crawl
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlCoordinate {
    pub country: String,
    pub city: String,
    pub category: String,
    pub page_number: u32,
}

impl CrawlCoordinate {
    /// Builds the listing URL for this coordinate
    ///
    /// # Example
    ///
    /// ```
    /// use event_harvester::crawler::CrawlCoordinate;
    /// use url::Url;
    ///
    /// let coordinate = CrawlCoordinate {
    ///     country: "united-kingdom".to_string(),
    ///     city: "london".to_string(),
    ///     category: "business".to_string(),
    ///     page_number: 2,
    /// };
    /// let base = Url::parse("https://www.eventbrite.com").unwrap();
    /// assert_eq!(
    ///     coordinate.listing_url(&base).unwrap().as_str(),
    ///     "https://www.eventbrite.com/d/united-kingdom--london/business--events/?page=2"
    /// );
    /// ```
    pub fn listing_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/d/{}--{}/{}--events/?page={}",
            base.as_str().trim_end_matches('/'),
            self.country,
            self.city,
            self.category,
            self.page_number
        ))
    }
}

impl fmt::Display for CrawlCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) '{}' page {}",
            self.city, self.country, self.category, self.page_number
        )
    }
}

/// All search slots in traversal order
pub fn search_slots(config: &Config) -> Vec<SearchSlot> {
    let mut slots = Vec::new();
    for location in &config.locations {
        for city in &location.cities {
            for category in &config.categories {
                slots.push(SearchSlot {
                    country: location.country.clone(),
                    city: city.clone(),
                    category: category.clone(),
                });
            }
        }
    }
    slots
}

/// Every coordinate the crawl could visit, assuming no page comes back empty
pub fn plan(config: &Config) -> impl Iterator<Item = CrawlCoordinate> + '_ {
    search_slots(config)
        .into_iter()
        .flat_map(move |slot| (1..=config.page_count).map(move |page| slot.at_page(page)))
}
