//! Postal address parsing for venue pages.
//!
//! Strategies run in order. A complete address (street, city and state) from
//! any strategy wins; only when none is complete does the first partial one
//! (say, city and state without a street) count.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::domain::RawPage;
use crate::extract::{element_text, first_match, strip_site_suffix, Document, ExtractorConfig, Strategy};

/// Lines collected after an "Address" heading before giving up
const SIBLING_LIMIT: usize = 10;

const ADDRESS_CHAIN: &[Strategy<PostalParts>] = &[
    Strategy { name: "address_heading", run: address_heading },
    Strategy { name: "address_element", run: address_element },
    Strategy { name: "raw_html_pattern", run: raw_html_pattern },
    Strategy { name: "visible_text_pattern", run: visible_text_pattern },
    Strategy { name: "visible_lines", run: visible_lines },
];

const PARTIAL_CHAIN: &[Strategy<PostalParts>] = &[
    Strategy { name: "address_heading_partial", run: address_heading_partial },
    Strategy { name: "address_element_partial", run: address_element_partial },
    Strategy { name: "visible_lines_partial", run: visible_lines_partial },
];

const NAME_CHAIN: &[Strategy<String>] = &[
    Strategy { name: "venue_heading", run: venue_heading },
    Strategy { name: "venue_title", run: venue_title },
];

static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static ADDRESS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("address").expect("valid selector"));

static STREET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\d+\s*\w.*(?:\b(?:street|st|avenue|ave|road|rd|lane|ln|drive|dr|boulevard|blvd|way|place|pl|court|ct|circle|cir|parkway|pkwy|highway|hwy|unit|suite)\b|#)",
    )
    .expect("valid regex")
});
static CITY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z\s\.]*?),\s*([A-Z]{2})\b\s*(\d{5})?").expect("valid regex")
});
static RAW_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+[^,\n<>]+(?:avenue|ave|street|st|road|rd|lane|ln|drive|dr|boulevard|blvd|way|circle|cir)[^,\n<>]*),\s*([A-Za-z\s]+),\s*([A-Z]{2})\s*(\d{5})",
    )
    .expect("valid regex")
});
static TEXT_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\s+[\w \.]+),\s*([A-Za-z ]+),\s*([A-Z]{2})\s*(\d{5})").expect("valid regex")
});

/// Street, city, state and zip as found on a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalParts {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl PostalParts {
    pub fn is_complete(&self) -> bool {
        !self.street.is_empty() && !self.city.is_empty() && !self.state.is_empty()
    }

    /// True when at least a street or a city was found
    pub fn is_partial(&self) -> bool {
        !self.street.is_empty() || !self.city.is_empty()
    }

    fn complete(self) -> Option<Self> {
        self.is_complete().then_some(self)
    }

    fn partial(self) -> Option<Self> {
        self.is_partial().then_some(self)
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Self {
        Self {
            street: caps[1].trim().to_string(),
            city: clean_city(&caps[2]),
            state: caps[3].to_uppercase(),
            zip: caps[4].to_string(),
        }
    }
}

/// What a venue page tells us
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenuePage {
    pub name: Option<String>,
    pub postal: Option<PostalParts>,
}

pub fn parse_venue_page(page: &RawPage, config: &ExtractorConfig) -> VenuePage {
    let doc = Document::parse(page);
    VenuePage {
        name: first_match("venue_name", &doc, config, NAME_CHAIN).map(|e| e.value),
        postal: first_match("address", &doc, config, ADDRESS_CHAIN)
            .or_else(|| first_match("partial_address", &doc, config, PARTIAL_CHAIN))
            .map(|e| e.value),
    }
}

/// Sort address lines into street and `City, ST ZIP`. The first line of
/// each kind wins.
pub fn classify_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> PostalParts {
    let mut parts = PostalParts::default();
    for line in lines {
        let line = line.trim();
        if STREET_LINE.is_match(line) {
            if parts.street.is_empty() {
                parts.street = line.to_string();
            }
        } else if !parts.city.is_empty() {
            continue;
        } else if let Some(caps) = CITY_LINE.captures(line) {
            parts.city = clean_city(&caps[1]);
            parts.state = caps[2].to_string();
            parts.zip = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();
        }
    }
    parts
}

/// Keep the last alphabetic word of a city label polluted by other text.
pub fn clean_city(raw: &str) -> String {
    let city = raw.trim();
    if city.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return city.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    city.split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

fn text_lines(element: &ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn is_heading(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Siblings following an "Address" heading, up to the next heading
fn heading_lines(doc: &Document<'_>) -> Option<PostalParts> {
    let heading = doc.select(&HEADINGS).find(|h| {
        element_text(h)
            .trim_end_matches(':')
            .eq_ignore_ascii_case("address")
    })?;

    let mut lines = Vec::new();
    for sibling in heading.next_siblings() {
        if let Some(text) = sibling.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        } else if let Some(element) = ElementRef::wrap(sibling) {
            if is_heading(&element) {
                break;
            }
            lines.extend(text_lines(&element));
        }
        if lines.len() > SIBLING_LIMIT {
            break;
        }
    }

    Some(classify_lines(lines.iter().map(String::as_str)))
}

fn element_lines<'a>(doc: &'a Document<'_>) -> impl Iterator<Item = PostalParts> + 'a {
    doc.select(&ADDRESS).map(|element| {
        let lines = text_lines(&element);
        classify_lines(lines.iter().map(String::as_str))
    })
}

fn address_heading(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    heading_lines(doc)?.complete()
}

fn address_heading_partial(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    heading_lines(doc)?.partial()
}

fn address_element(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    element_lines(doc).find_map(PostalParts::complete)
}

fn address_element_partial(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    element_lines(doc).find_map(PostalParts::partial)
}

fn raw_html_pattern(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    let caps = RAW_ADDRESS.captures(doc.raw_html())?;
    PostalParts::from_captures(&caps).complete()
}

fn visible_text_pattern(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    doc.lines().iter().find_map(|line| {
        let caps = TEXT_ADDRESS.captures(line)?;
        PostalParts::from_captures(&caps).complete()
    })
}

/// Street and city lines anywhere in the visible text
fn visible_lines(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    classify_lines(doc.lines().iter().map(String::as_str)).complete()
}

fn visible_lines_partial(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<PostalParts> {
    classify_lines(doc.lines().iter().map(String::as_str)).partial()
}

fn venue_heading(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    doc.select(&H1)
        .map(|h| element_text(&h))
        .find(|t| !t.is_empty())
}

fn venue_title(doc: &Document<'_>, config: &ExtractorConfig) -> Option<String> {
    let title = doc.select(&TITLE).next().map(|t| element_text(&t))?;
    let title = strip_site_suffix(&title, &config.site_name);
    (!title.is_empty()).then_some(title)
}
