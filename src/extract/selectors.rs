use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Selector};

/// Compiled selectors for listing and detail pages
#[derive(Debug, Clone)]
pub struct Selectors {
    pub event_card: Selector,
    pub card_price: Selector,
    pub card_link: Selector,
    pub event_name: Selector,
    pub date_time: Selector,
    pub description: Selector,
    pub venue: Selector,
    pub organizer: Selector,
    pub thumbnail: Selector,
    pub(crate) paragraph: Selector,
    pub(crate) anchor: Selector,
}

impl Selectors {
    /// Compiles every selector in the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Selectors)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed to parse
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            event_card: parse("event-card", &config.event_card)?,
            card_price: parse("card-price", &config.card_price)?,
            card_link: parse("card-link", &config.card_link)?,
            event_name: parse("event-name", &config.event_name)?,
            date_time: parse("date-time", &config.date_time)?,
            description: parse("description", &config.description)?,
            venue: parse("venue", &config.venue)?,
            organizer: parse("organizer", &config.organizer)?,
            thumbnail: parse("thumbnail", &config.thumbnail)?,
            paragraph: parse("paragraph", "p")?,
            anchor: parse("anchor", "a")?,
        })
    }
}

fn parse(field: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}

/// Text content of an element with each text node trimmed and the pieces
/// joined without a separator
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_default_selectors_compile() {
        assert!(Selectors::compile(&SelectorConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_selector_names_field() {
        let config = SelectorConfig {
            date_time: ":::".to_string(),
            ..SelectorConfig::default()
        };

        match Selectors::compile(&config) {
            Err(ConfigError::InvalidSelector { field, .. }) => assert_eq!(field, "date-time"),
            other => panic!("expected InvalidSelector, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_stripped_text() {
        let html = Html::parse_fragment("<p>  Hello <b> world </b>\n</p>");
        let selector = Selector::parse("p").unwrap();
        let p = html.select(&selector).next().unwrap();
        assert_eq!(stripped_text(p), "Helloworld");
    }
}
