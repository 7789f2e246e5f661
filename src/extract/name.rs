use std::sync::LazyLock;

use scraper::Selector;

use super::document::{collapse_whitespace, element_text};
use super::{Document, ExtractorConfig, Strategy};

/// The in-page title is preferred: the site renders the real title inline,
/// and page metadata often lags behind edits.
pub(super) const CHAIN: &[Strategy<String>] = &[
    Strategy { name: "in_page_title", run: in_page_title },
    Strategy { name: "title_heading", run: title_heading },
    Strategy { name: "page_title", run: page_title },
    Strategy { name: "og_title", run: og_title },
];

const MAX_TITLE_LEN: usize = 200;
const SEPARATORS: &[&str] = &[" · ", " | ", " - ", " – ", " — "];

static TITLE_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1.event-title, [data-event-title], h1").expect("valid selector")
});
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector"));

/// The line right above the date/time marker line.
fn in_page_title(doc: &Document<'_>, config: &ExtractorConfig) -> Option<String> {
    let marker = config.time_marker.as_str();
    doc.lines()
        .windows(2)
        .find(|pair| !pair[0].contains(marker) && pair[1].contains(marker))
        .map(|pair| pair[0].clone())
        .filter(|title| title.chars().count() <= MAX_TITLE_LEN)
}

fn title_heading(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    doc.select(&TITLE_HEADING)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

fn page_title(doc: &Document<'_>, config: &ExtractorConfig) -> Option<String> {
    let title = doc.select(&TITLE).next().map(|el| element_text(&el))?;
    non_empty(strip_site_suffix(&title, &config.site_name))
}

fn og_title(doc: &Document<'_>, config: &ExtractorConfig) -> Option<String> {
    let title = doc.select(&OG_TITLE).next()?.value().attr("content")?;
    let title = html_escape::decode_html_entities(title);
    non_empty(strip_site_suffix(&collapse_whitespace(&title), &config.site_name))
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Remove a trailing `· Site` (or `| Site`, `- Site`) from a page title.
pub fn strip_site_suffix(title: &str, site_name: &str) -> String {
    let title = title.trim();
    if site_name.is_empty() {
        return title.to_string();
    }

    let lower = title.to_lowercase();
    let site = site_name.to_lowercase();
    for sep in SEPARATORS {
        let suffix = format!("{}{}", sep, site);
        if lower.ends_with(&suffix) {
            // Lowercasing can change byte lengths outside ASCII; fall back to
            // the untouched title when the cut point is not a char boundary.
            let cut = title.len().saturating_sub(suffix.len());
            if let Some(head) = title.get(..cut) {
                return head.trim().to_string();
            }
        }
    }

    if lower == site {
        return String::new();
    }

    title.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawPage;
    use crate::extract::first_match;

    fn name_of(html: &str) -> Option<(String, &'static str)> {
        let page = RawPage::new("https://pasito.fun/e/x", html);
        let doc = Document::parse(&page);
        first_match("name", &doc, &ExtractorConfig::default(), CHAIN).map(|e| (e.value, e.source))
    }

    #[test]
    fn test_strip_site_suffix() {
        assert_eq!(strip_site_suffix("Friday Night Social · Pasito", "Pasito"), "Friday Night Social");
        assert_eq!(strip_site_suffix("Salsa Sundays | pasito", "Pasito"), "Salsa Sundays");
        assert_eq!(strip_site_suffix("Salsa - Bachata", "Pasito"), "Salsa - Bachata");
        assert_eq!(strip_site_suffix("Pasito", "Pasito"), "");
    }

    #[test]
    fn test_in_page_title_preferred_over_metadata() {
        let html = r#"<html><head><title>Old Name · Pasito</title></head><body>
            <h1>Heading Name</h1>
            <div>Bachata Night Live</div>
            <div>🕘 Sat, Jun 7 8:00 PM - 11:00 PM</div>
        </body></html>"#;
        assert_eq!(
            name_of(html),
            Some(("Bachata Night Live".to_string(), "in_page_title"))
        );
    }

    #[test]
    fn test_heading_without_marker() {
        let html = r#"<html><head><title>Old Name · Pasito</title></head><body>
            <h1 class="event-title">Heading Name</h1>
        </body></html>"#;
        assert_eq!(name_of(html), Some(("Heading Name".to_string(), "title_heading")));
    }

    #[test]
    fn test_page_title_suffix_stripped() {
        let html = "<html><head><title>Friday Night Social · Pasito</title></head><body></body></html>";
        assert_eq!(
            name_of(html),
            Some(("Friday Night Social".to_string(), "page_title"))
        );
    }

    #[test]
    fn test_og_title_last_resort() {
        let html = r#"<html><head><meta property="og:title" content="Rueda &amp; Salsa · Pasito"></head><body></body></html>"#;
        assert_eq!(name_of(html), Some(("Rueda & Salsa".to_string(), "og_title")));
    }

    #[test]
    fn test_marker_on_first_line_has_no_title() {
        let html = "<html><body><div>🕘 Fri, Jun 6 7:00 PM - 9:00 PM</div></body></html>";
        assert_eq!(name_of(html), None);
    }
}
