//! Event and series identifiers.
//!
//! Identifiers arrive as bare slugs (`salsa-night-289dc`), with a leading
//! `@`, or as full page URLs (`https://pasito.fun/e/salsa-night-289dc`).

/// Path segment for single event pages
pub const EVENT_SEGMENT: &str = "e";

/// Path segment for series pages
pub const SERIES_SEGMENT: &str = "es";

/// Reduce an event identifier to its slug.
pub fn event_slug(input: &str) -> Option<String> {
    slug(input, EVENT_SEGMENT)
}

/// Reduce a series identifier to its slug.
pub fn series_slug(input: &str) -> Option<String> {
    slug(input, SERIES_SEGMENT)
}

pub fn event_url(base_url: &str, slug: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), EVENT_SEGMENT, slug)
}

pub fn series_url(base_url: &str, slug: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), SERIES_SEGMENT, slug)
}

fn slug(input: &str, segment: &str) -> Option<String> {
    let input = input.trim().trim_start_matches('@');
    if input.is_empty() {
        return None;
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let parsed = url::Url::parse(input).ok()?;
        let mut segments = parsed.path_segments()?;
        while let Some(s) = segments.next() {
            if s == segment {
                return segments
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(String::from);
            }
        }
        return None;
    }

    let prefix = format!("/{}/", segment);
    let bare = input.strip_prefix(&prefix).unwrap_or(input);
    let bare = bare.trim_matches('/');
    (!bare.is_empty() && !bare.contains('/')).then(|| bare.to_string())
}
