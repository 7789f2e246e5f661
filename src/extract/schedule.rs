//! Date and time fragments from the marker line, e.g.
//! `🕘 Fri, Jun 6 7:00 PM — 11:00 PM`.
//!
//! Both patterns anchor on the same marker and stay on its line. Nothing here
//! knows the year or the zone; that is the normalizer's job.

use regex::Regex;

use super::{Document, ExtractorConfig, Strategy};
use crate::domain::{RawDate, RawTimeRange};

pub(super) const TIME_CHAIN: &[Strategy<RawTimeRange>] = &[Strategy {
    name: "marker_time_range",
    run: marker_time_range,
}];

pub(super) const DATE_CHAIN: &[Strategy<RawDate>] = &[Strategy {
    name: "marker_date",
    run: marker_date,
}];

const CLOCK: &str = r"(\d{1,2}:\d{2}\s*[AaPp]\.?[Mm]\.?)";
const DASH: &str = r"\s*[-–—]\s*";
const DATE: &str = r"\b([A-Za-z]{3})[A-Za-z]*\.?,?\s+([A-Za-z]{3})[A-Za-z]*\.?\s+(\d{1,2})\b";

/// `marker` then anything on the same line, then `body`
fn marker_pattern(config: &ExtractorConfig, body: &str) -> Option<Regex> {
    let marker = config.time_marker.trim();
    if marker.is_empty() {
        return None;
    }
    Regex::new(&format!("{}.*?{}", regex::escape(marker), body)).ok()
}

fn marker_time_range(doc: &Document<'_>, config: &ExtractorConfig) -> Option<RawTimeRange> {
    let pattern = marker_pattern(config, &format!("{CLOCK}{DASH}{CLOCK}"))?;
    let caps = pattern.captures(doc.text())?;
    Some(RawTimeRange::new(caps[1].trim(), caps[2].trim()))
}

fn marker_date(doc: &Document<'_>, config: &ExtractorConfig) -> Option<RawDate> {
    let pattern = marker_pattern(config, DATE)?;
    let caps = pattern.captures(doc.text())?;
    Some(RawDate {
        weekday: Some(caps[1].to_string()),
        ..RawDate::new(&caps[2], &caps[3])
    })
}
