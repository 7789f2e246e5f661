use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::RawPage;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("valid selector"));

/// Elements whose content never shows up as visible text
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// Elements that start a new line of visible text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// A parsed page plus its visible text, split into trimmed non-empty lines.
///
/// Holds a `scraper::Html`, which is not `Send`: build it, extract, drop it,
/// all without crossing an `.await`.
pub struct Document<'a> {
    base: Option<Url>,
    raw: &'a str,
    html: Html,
    text: String,
    lines: Vec<String>,
}

impl<'a> Document<'a> {
    pub fn parse(page: &'a RawPage) -> Self {
        let html = Html::parse_document(&page.html);
        let text = match &page.text {
            Some(text) => text.clone(),
            None => visible_text(&html),
        };
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();

        Self {
            base: Url::parse(&page.url).ok(),
            raw: &page.html,
            html,
            text,
            lines,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn raw_html(&self) -> &str {
        self.raw
    }

    /// Visible text, one block per line
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn select<'s>(&'s self, selector: &'s Selector) -> impl Iterator<Item = ElementRef<'s>> + 's {
        self.html.select(selector)
    }

    /// Resolve an href against the page URL
    pub fn absolute(&self, href: &str) -> Option<String> {
        match &self.base {
            Some(base) => base.join(href).ok().map(String::from),
            None => Url::parse(href).ok().map(String::from),
        }
    }

    /// True when `href` points at the same host as the page (or is relative)
    pub fn is_same_site(&self, href: &str) -> bool {
        if href.starts_with('/') && !href.starts_with("//") {
            return true;
        }
        match (&self.base, Url::parse(href)) {
            (Some(base), Ok(target)) => base.host_str() == target.host_str(),
            _ => false,
        }
    }
}

/// Text of an element with whitespace collapsed
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Approximate a browser's `innerText` for the page body.
pub fn visible_text(html: &Html) -> String {
    let Some(body) = html.select(&BODY).next() else {
        return String::new();
    };

    let mut lines = Vec::new();
    let mut current = String::new();
    walk(body, &mut lines, &mut current);
    flush(&mut lines, &mut current);
    lines.join("\n")
}

fn walk(element: ElementRef<'_>, lines: &mut Vec<String>, current: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            current.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if HIDDEN_TAGS.contains(&name) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                flush(lines, current);
            }
            walk(child, lines, current);
            if block {
                flush(lines, current);
            }
        }
    }
}

fn flush(lines: &mut Vec<String>, current: &mut String) {
    let line = collapse_whitespace(current);
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_splits_blocks_and_joins_inline() {
        let page = RawPage::new(
            "https://pasito.fun/e/x",
            r#"<html><head><title>T</title><style>p{}</style></head><body>
                <h1>Friday  Night Social</h1>
                <div>🕘 <span>Fri, Jun 6</span> <b>7:00 PM</b> — 11:00 PM</div>
                <script>var x = 1;</script>
                <p>Every week<br>we dance.</p>
            </body></html>"#,
        );
        let doc = Document::parse(&page);

        assert_eq!(
            doc.lines(),
            &[
                "Friday Night Social".to_string(),
                "🕘 Fri, Jun 6 7:00 PM — 11:00 PM".to_string(),
                "Every week".to_string(),
                "we dance.".to_string(),
            ]
        );
    }

    #[test]
    fn test_rendered_text_wins_over_html() {
        let page = RawPage::new("https://pasito.fun/e/x", "<body><p>html</p></body>")
            .with_text("rendered\n\n  line two ");
        let doc = Document::parse(&page);
        assert_eq!(doc.lines(), &["rendered".to_string(), "line two".to_string()]);
    }

    #[test]
    fn test_absolute_and_same_site() {
        let page = RawPage::new("https://pasito.fun/e/x", "");
        let doc = Document::parse(&page);

        assert_eq!(
            doc.absolute("/l/the-hall").as_deref(),
            Some("https://pasito.fun/l/the-hall")
        );
        assert!(doc.is_same_site("/l/the-hall"));
        assert!(doc.is_same_site("https://pasito.fun/l/the-hall"));
        assert!(!doc.is_same_site("https://maps.google.com/?q=x"));
        assert!(!doc.is_same_site("//cdn.example.com/x"));
    }
}
