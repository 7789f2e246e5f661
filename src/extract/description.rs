use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use super::document::{collapse_whitespace, element_text};
use super::{Document, ExtractorConfig, Strategy};

pub(super) const CHAIN: &[Strategy<String>] = &[
    Strategy { name: "meta_description", run: meta_description },
    Strategy { name: "prose", run: prose },
    Strategy { name: "keyword_scan", run: keyword_scan },
    Strategy { name: "full_text", run: full_text },
];

static META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="description"], meta[property="og:description"]"#)
        .expect("valid selector")
});
static PROSE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".prose, .event-description, [data-event-description]").expect("valid selector")
});

fn meta_description(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    doc.select(&META)
        .filter_map(|el| el.value().attr("content"))
        .map(|content| collapse_whitespace(&html_escape::decode_html_entities(content)))
        .find(|content| !content.is_empty())
}

fn prose(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    doc.select(&PROSE)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

/// Lines from the first trigger word up to a stopper or the time marker line.
fn keyword_scan(doc: &Document<'_>, config: &ExtractorConfig) -> Option<String> {
    let trigger = word_pattern(&config.description_triggers)?;
    let lines = doc.lines();
    let start = lines.iter().position(|line| trigger.is_match(line))?;

    let block: Vec<&str> = lines[start..]
        .iter()
        .enumerate()
        .take_while(|(i, line)| *i == 0 || !line.contains(config.time_marker.as_str()))
        .map(|(_, line)| line.as_str())
        .collect();

    clean_description(
        &block.join("\n"),
        &config.description_triggers,
        &config.description_stoppers,
    )
}

fn full_text(doc: &Document<'_>, _config: &ExtractorConfig) -> Option<String> {
    let text = collapse_whitespace(doc.text());
    (!text.is_empty()).then_some(text)
}

/// Clip `text` to the span that opens with a trigger word and closes before
/// the first stopper word after it. Whitespace is collapsed.
///
/// Returns `None` when no trigger word occurs or nothing is left.
pub fn clean_description(text: &str, triggers: &[String], stoppers: &[String]) -> Option<String> {
    let text = collapse_whitespace(text);
    let start = word_pattern(triggers)?.find(&text)?.start();
    let rest = &text[start..];

    let end = word_pattern(stoppers)
        .and_then(|stop| stop.find(rest))
        .map(|m| m.start())
        .unwrap_or(rest.len());

    let cleaned = rest[..end].trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Case-insensitive whole-word alternation; `None` for an empty word list.
fn word_pattern(words: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).ok()
}
