use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use super::document::element_text;
use super::{Document, ExtractorConfig, Strategy};

pub(super) const COVER_CHAIN: &[Strategy<String>] = &[Strategy {
    name: "og_image",
    run: og_image,
}];

pub(super) const TICKET_CHAIN: &[Strategy<String>] = &[
    Strategy { name: "ticket_link", run: ticket_link },
    Strategy { name: "ticket_text", run: ticket_text },
];

static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).expect("valid selector"));
static TICKET_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.ticket-link[href]").expect("valid selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static TICKET_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btickets?\b").expect("valid regex"));

fn og_image(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    let content = doc.select(&OG_IMAGE).next()?.value().attr("content")?.trim();
    if content.is_empty() {
        return None;
    }
    doc.absolute(content)
}

fn ticket_link(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    doc.select(&TICKET_LINK)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| doc.absolute(href))
}

fn ticket_text(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    doc.select(&ANCHOR)
        .filter(|a| TICKET_WORD.is_match(&element_text(a)))
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| doc.absolute(href))
}
