use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use url::Url;

use super::document::element_text;
use super::{Document, ExtractorConfig, Strategy};
use crate::domain::VenueReference;

/// Tiers in order of trust. A region line only says where, not which venue.
pub(super) const CHAIN: &[Strategy<VenueReference>] = &[
    Strategy { name: "venue_path_link", run: venue_path_link },
    Strategy { name: "venue_keyword_link", run: venue_keyword_link },
    Strategy { name: "region_line", run: region_line },
];

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z\s]*?),\s*([A-Z]{2})\b").expect("valid regex"));

fn link(doc: &Document<'_>, href: &str, label: String) -> Option<VenueReference> {
    Some(VenueReference::Link {
        url: doc.absolute(href)?,
        label: (!label.is_empty()).then_some(label),
    })
}

/// Tier 1: first anchor whose path starts with a venue prefix
fn venue_path_link(doc: &Document<'_>, config: &ExtractorConfig) -> Option<VenueReference> {
    doc.select(&ANCHOR).find_map(|a| {
        let href = a.value().attr("href")?;
        if !doc.is_same_site(href) {
            return None;
        }
        let path = href_path(href);
        config
            .venue_path_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            .then(|| link(doc, href, element_text(&a)))
            .flatten()
    })
}

/// Tier 2: a same-site relative link whose text names a venue
fn venue_keyword_link(doc: &Document<'_>, config: &ExtractorConfig) -> Option<VenueReference> {
    doc.select(&ANCHOR).find_map(|a| {
        let href = a.value().attr("href")?;
        if !href.starts_with('/') || href.starts_with("//") {
            return None;
        }
        let text = element_text(&a);
        let lower = text.to_lowercase();
        config
            .venue_keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
            .then(|| link(doc, href, text))
            .flatten()
    })
}

/// Tier 3: a visible `City, ST` line
fn region_line(doc: &Document<'_>, config: &ExtractorConfig) -> Option<VenueReference> {
    doc.lines().iter().find_map(|line| {
        let lower = line.to_lowercase();
        if config.region_stopwords.iter().any(|w| lower.contains(&w.to_lowercase())) {
            return None;
        }
        let caps = REGION.captures(line)?;
        let city = caps[1].trim();
        if city.len() <= 2 {
            return None;
        }
        Some(VenueReference::Region {
            city: city.to_string(),
            state: caps[2].to_string(),
        })
    })
}

/// Path component of an absolute or root-relative href
fn href_path(href: &str) -> String {
    match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawPage;
    use crate::extract::first_match;

    fn venue_of(html: &str) -> Option<(VenueReference, &'static str)> {
        let page = RawPage::new("https://pasito.fun/e/x", html);
        let doc = Document::parse(&page);
        first_match("venue", &doc, &ExtractorConfig::default(), CHAIN).map(|e| (e.value, e.source))
    }

    #[test]
    fn test_path_link_beats_region_line() {
        let html = r#"<html><body>
            <p>Denver, CO</p>
            <a href="/about">About us</a>
            <a href="/l/the-hall"> The  Hall </a>
        </body></html>"#;
        assert_eq!(
            venue_of(html),
            Some((
                VenueReference::Link {
                    url: "https://pasito.fun/l/the-hall".into(),
                    label: Some("The Hall".into()),
                },
                "venue_path_link"
            ))
        );
    }

    #[test]
    fn test_path_link_absolute_same_site() {
        let html = r#"<a href="https://pasito.fun/l/studio-b">Studio B</a>"#;
        let (venue, _) = venue_of(html).unwrap();
        assert_eq!(venue.url(), Some("https://pasito.fun/l/studio-b"));
    }

    #[test]
    fn test_configured_prefix() {
        let page = RawPage::new("https://pasito.fun/e/x", r#"<a href="/venues/studio-b">Studio B</a>"#);
        let doc = Document::parse(&page);
        let config = ExtractorConfig {
            venue_path_prefixes: vec!["/l/".into(), "/venues/".into()],
            ..ExtractorConfig::default()
        };
        let found = first_match("venue", &doc, &config, CHAIN).unwrap();
        assert_eq!(found.source, "venue_path_link");
        assert_eq!(found.value.url(), Some("https://pasito.fun/venues/studio-b"));
    }

    #[test]
    fn test_keyword_link_needs_relative_target() {
        let html = r#"<html><body>
            <a href="https://maps.example.com/q">Venue map</a>
            <a href="/place/42">Grand Ballroom</a>
        </body></html>"#;
        assert_eq!(
            venue_of(html),
            Some((
                VenueReference::Link {
                    url: "https://pasito.fun/place/42".into(),
                    label: Some("Grand Ballroom".into()),
                },
                "venue_keyword_link"
            ))
        );
    }

    #[test]
    fn test_region_line_skips_stopwords() {
        let html = r#"<html><body>
            <p>Salsa Social, CO</p>
            <p>Fort Collins, CO</p>
        </body></html>"#;
        assert_eq!(
            venue_of(html),
            Some((
                VenueReference::Region {
                    city: "Fort Collins".into(),
                    state: "CO".into(),
                },
                "region_line"
            ))
        );
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(venue_of("<html><body><p>No location here</p></body></html>"), None);
    }
}
