use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::Selector;

use super::Document;
use crate::domain::ids::{self, EVENT_SEGMENT};
use crate::domain::RawPage;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Event slugs linked from a series listing page, in page order, without repeats.
pub fn event_slugs(page: &RawPage) -> Vec<String> {
    let doc = Document::parse(page);
    let prefix = format!("/{}/", EVENT_SEGMENT);
    let mut seen = HashSet::new();

    doc.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(&prefix) || (doc.is_same_site(href) && href.contains(&prefix)))
        .filter_map(ids::event_slug)
        .filter(|slug| seen.insert(slug.clone()))
        .collect()
}
