//! Field extraction from event pages.
//!
//! Every field is pulled by an ordered chain of independent strategies with
//! the same shape, `(document, config) -> Option<value>`. The chain stops at
//! the first strategy that finds something and records which one it was.
//! Extraction is pure: it sees only the page and an [`ExtractorConfig`].
//!
//! ```text
//! RawPage → Document → [name | description | schedule | venue | media] → ExtractedFields
//! ```

mod description;
mod document;
mod media;
mod name;
mod schedule;
mod series;
mod venue;

pub use description::clean_description;
pub use document::{collapse_whitespace, element_text, visible_text, Document};
pub use name::strip_site_suffix;
pub use series::event_slugs;

use serde::{Deserialize, Serialize};

use crate::domain::{Extracted, ExtractedFields, RawPage};

/// Site conventions the extractors rely on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Site name appended to page titles, e.g. `Social · Pasito`
    pub site_name: String,

    /// Path prefixes of venue pages, tried in order
    pub venue_path_prefixes: Vec<String>,

    /// Marker that precedes the date and time line
    pub time_marker: String,

    /// Words that open the event description
    pub description_triggers: Vec<String>,

    /// Words that close the event description
    pub description_stoppers: Vec<String>,

    /// Link texts that suggest a venue page
    pub venue_keywords: Vec<String>,

    /// Words that disqualify a `City, ST` line as a location
    pub region_stopwords: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            site_name: "Pasito".to_string(),
            venue_path_prefixes: vec!["/l/".to_string()],
            time_marker: "🕘".to_string(),
            description_triggers: strings(&["every", "join", "welcome", "about"]),
            description_stoppers: strings(&["website", "register", "sign in", "open options", "blog"]),
            venue_keywords: strings(&["venue", "location", "address", "ballroom", "hall"]),
            region_stopwords: strings(&["series", "organizer", "social"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// One way of finding a value in a document.
pub struct Strategy<T> {
    pub name: &'static str,
    pub run: fn(&Document<'_>, &ExtractorConfig) -> Option<T>,
}

/// Run `chain` in order, returning the first hit tagged with its strategy.
pub fn first_match<T>(
    field: &str,
    doc: &Document<'_>,
    config: &ExtractorConfig,
    chain: &[Strategy<T>],
) -> Option<Extracted<T>> {
    for strategy in chain {
        if let Some(value) = (strategy.run)(doc, config) {
            tracing::debug!(field, strategy = strategy.name, "field found");
            return Some(Extracted::new(value, strategy.name));
        }
    }
    tracing::debug!(field, "field not found");
    None
}

/// Runs every field extractor over a page.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract(&self, page: &RawPage) -> ExtractedFields {
        let doc = Document::parse(page);
        let config = &self.config;

        let fields = ExtractedFields {
            name: first_match("name", &doc, config, name::CHAIN),
            description: first_match("description", &doc, config, description::CHAIN),
            cover_image_url: first_match("cover_image_url", &doc, config, media::COVER_CHAIN),
            raw_time_range: first_match("time_range", &doc, config, schedule::TIME_CHAIN),
            raw_date: first_match("date", &doc, config, schedule::DATE_CHAIN),
            venue_reference: first_match("venue", &doc, config, venue::CHAIN),
            ticket_url: first_match("ticket_url", &doc, config, media::TICKET_CHAIN),
        };

        let missing = fields.missing();
        if !missing.is_empty() {
            tracing::info!("{}: no {} found", page.url, missing.join(", "));
        }

        fields
    }
}
