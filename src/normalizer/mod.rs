//! Scraped date and time fragments → absolute time window.
//!
//! [`normalize`] is strict: any malformed input is an error naming it.
//! [`TimeNormalizer::lenient`] substitutes the configured defaults piece by
//! piece and always produces a window; preview runs use it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{RawDate, RawTimeRange, TimeWindow};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Invalid time '{0}'")]
    InvalidTime(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Unknown time zone '{0}'")]
    UnknownZone(String),

    #[error("Local time {0} does not exist in {1}")]
    NonexistentLocalTime(String, String),

    #[error("Start and end are both {0}")]
    EmptyWindow(String),

    #[error("No {0} found on the page")]
    Missing(&'static str),
}

/// Values used when a page does not say when an event happens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDefaults {
    /// IANA zone the site's times are in (default: America/Denver)
    pub timezone: String,

    /// Start time, 24-hour `HH:MM` (default: 19:00)
    pub start: String,

    /// Event length in hours (default: 3)
    pub duration_hours: u32,
}

impl Default for ScheduleDefaults {
    fn default() -> Self {
        Self {
            timezone: "America/Denver".to_string(),
            start: "19:00".to_string(),
            duration_hours: 3,
        }
    }
}

impl ScheduleDefaults {
    fn zone(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown default time zone '{}', using America/Denver", self.timezone);
            chrono_tz::America::Denver
        })
    }

    fn start_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(self.start.trim(), "%H:%M").unwrap_or_else(|_| {
            tracing::warn!("Invalid default start '{}', using 19:00", self.start);
            NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default()
        })
    }

    fn duration(&self) -> Duration {
        Duration::hours(i64::from(self.duration_hours.max(1)))
    }
}

/// Parse a 12-hour clock reading: `7:00 PM`, `7:00PM`, `7:00 p.m.`
pub fn parse_clock(raw: &str) -> Result<NaiveTime, NormalizationError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_uppercase();

    let split = compact.len().saturating_sub(2);
    let (clock, meridiem) = match (compact.get(..split), compact.get(split..)) {
        (Some(clock), Some(meridiem @ ("AM" | "PM"))) => (clock, meridiem),
        _ => return Err(NormalizationError::InvalidTime(raw.to_string())),
    };

    NaiveTime::parse_from_str(&format!("{} {}", clock, meridiem), "%I:%M %p")
        .map_err(|_| NormalizationError::InvalidTime(raw.to_string()))
}

/// Combine month and day with a year.
pub fn parse_date(raw: &RawDate, year: i32) -> Result<NaiveDate, NormalizationError> {
    let shown = format!("{} {}", raw.month, raw.day);
    let month: String = raw.month.trim().chars().take(3).collect();
    NaiveDate::parse_from_str(&format!("{} {} {}", month, raw.day.trim(), year), "%b %d %Y")
        .map_err(|_| NormalizationError::InvalidDate(shown))
}

pub fn parse_zone(name: &str) -> Result<Tz, NormalizationError> {
    name.trim()
        .parse()
        .map_err(|_| NormalizationError::UnknownZone(name.to_string()))
}

/// Length of a clock range; an end before the start runs past midnight.
fn span(start: NaiveTime, end: NaiveTime) -> Option<Duration> {
    let diff = end - start;
    if diff > Duration::zero() {
        Some(diff)
    } else if diff < Duration::zero() {
        Some(diff + Duration::days(1))
    } else {
        None
    }
}

fn localize(naive: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>, NormalizationError> {
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| NormalizationError::NonexistentLocalTime(naive.to_string(), zone.name().to_string()))
}

fn window(start: DateTime<Utc>, length: Duration, zone: Tz, shown: &str) -> Result<TimeWindow, NormalizationError> {
    TimeWindow::new(start, start + length, zone).ok_or_else(|| NormalizationError::EmptyWindow(shown.to_string()))
}

/// Turn a clock range and a month/day into absolute instants.
pub fn normalize(
    range: &RawTimeRange,
    date: &RawDate,
    reference_year: i32,
    zone_name: &str,
) -> Result<TimeWindow, NormalizationError> {
    let start = parse_clock(&range.start)?;
    let end = parse_clock(&range.end)?;
    let length = span(start, end).ok_or_else(|| NormalizationError::EmptyWindow(range.start.clone()))?;
    let day = parse_date(date, reference_year)?;
    let zone = parse_zone(zone_name)?;

    let start = localize(day.and_time(start), zone)?;
    window(start, length, zone, &range.start)
}

/// Normalization with configured defaults.
#[derive(Debug, Clone, Default)]
pub struct TimeNormalizer {
    defaults: ScheduleDefaults,
}

impl TimeNormalizer {
    pub fn new(defaults: ScheduleDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ScheduleDefaults {
        &self.defaults
    }

    /// Fails when either fragment is missing or malformed.
    pub fn strict(
        &self,
        range: Option<&RawTimeRange>,
        date: Option<&RawDate>,
        reference_year: i32,
    ) -> Result<TimeWindow, NormalizationError> {
        let range = range.ok_or(NormalizationError::Missing("time range"))?;
        let date = date.ok_or(NormalizationError::Missing("date"))?;
        normalize(range, date, reference_year, &self.defaults.timezone)
    }

    /// Never fails. Each missing or malformed piece takes its default:
    /// the reference date, a 19:00 start, a 3-hour length, the default zone.
    pub fn lenient(
        &self,
        range: Option<&RawTimeRange>,
        date: Option<&RawDate>,
        reference: NaiveDate,
    ) -> TimeWindow {
        let zone = self.defaults.zone();

        let day = match date.map(|d| parse_date(d, reference.year())) {
            Some(Ok(day)) => day,
            Some(Err(e)) => {
                tracing::warn!("{}, using {}", e, reference);
                reference
            }
            None => reference,
        };

        let clocks = range.map(|r| (parse_clock(&r.start), parse_clock(&r.end)));
        let (start, length) = match clocks {
            Some((Ok(start), Ok(end))) => (start, span(start, end).unwrap_or_else(|| self.defaults.duration())),
            Some((Ok(start), Err(e))) => {
                tracing::warn!("{}, using a {}h duration", e, self.defaults.duration_hours);
                (start, self.defaults.duration())
            }
            Some((Err(e), _)) => {
                tracing::warn!("{}, using the default start {}", e, self.defaults.start);
                (self.defaults.start_time(), self.defaults.duration())
            }
            None => (self.defaults.start_time(), self.defaults.duration()),
        };

        let naive = day.and_time(start);
        let start = localize(naive, zone)
            .or_else(|_| localize(naive + Duration::hours(1), zone))
            .unwrap_or_else(|_| Utc.from_utc_datetime(&naive));

        TimeWindow::starting_at(start, length, zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> RawTimeRange {
        RawTimeRange::new(start, end)
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_clock_variants() {
        let seven_pm = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
        assert_eq!(parse_clock("7:00 PM").unwrap(), seven_pm);
        assert_eq!(parse_clock("7:00PM").unwrap(), seven_pm);
        assert_eq!(parse_clock(" 7:00 p.m. ").unwrap(), seven_pm);
        assert_eq!(parse_clock("12:30 AM").unwrap(), NaiveTime::from_hms_opt(0, 30, 0).unwrap());
        assert_eq!(
            parse_clock("19:00"),
            Err(NormalizationError::InvalidTime("19:00".into()))
        );
        assert!(parse_clock("13:00 PM").is_err());
    }

    #[test]
    fn test_normalize_evening_in_denver() {
        let window = normalize(&range("7:00 PM", "11:00 PM"), &RawDate::new("Jun", "6"), 2025, "America/Denver").unwrap();

        assert_eq!(window.start(), utc("2025-06-07T01:00:00Z"));
        assert_eq!(window.end(), utc("2025-06-07T05:00:00Z"));
        assert_eq!(window.local_start().to_rfc3339(), "2025-06-06T19:00:00-06:00");
        assert_eq!(window.local_end().to_rfc3339(), "2025-06-06T23:00:00-06:00");
    }

    #[test]
    fn test_normalize_overnight() {
        let window = normalize(&range("6:30 PM", "12:30 AM"), &RawDate::new("Jun", "6"), 2025, "America/Denver").unwrap();

        assert_eq!(window.duration(), Duration::hours(6));
        assert_eq!(window.local_end().date_naive(), NaiveDate::from_ymd_opt(2025, 6, 7).unwrap());
        assert!(window.end() > window.start());
    }

    #[test]
    fn test_normalize_errors_name_the_input() {
        let date = RawDate::new("Jun", "6");
        assert_eq!(
            normalize(&range("7 PM", "9:00 PM"), &date, 2025, "America/Denver"),
            Err(NormalizationError::InvalidTime("7 PM".into()))
        );
        assert_eq!(
            normalize(&range("7:00 PM", "9:00 PM"), &RawDate::new("Jux", "6"), 2025, "America/Denver"),
            Err(NormalizationError::InvalidDate("Jux 6".into()))
        );
        assert_eq!(
            normalize(&range("7:00 PM", "9:00 PM"), &RawDate::new("Feb", "30"), 2025, "America/Denver"),
            Err(NormalizationError::InvalidDate("Feb 30".into()))
        );
        assert_eq!(
            normalize(&range("7:00 PM", "9:00 PM"), &date, 2025, "Mars/Olympus"),
            Err(NormalizationError::UnknownZone("Mars/Olympus".into()))
        );
        assert_eq!(
            normalize(&range("7:00 PM", "7:00 PM"), &date, 2025, "America/Denver"),
            Err(NormalizationError::EmptyWindow("7:00 PM".into()))
        );
    }

    #[test]
    fn test_normalize_spring_forward_gap() {
        // 2:30 AM does not exist in Denver on 2025-03-09
        let err = normalize(&range("2:30 AM", "4:00 AM"), &RawDate::new("Mar", "9"), 2025, "America/Denver").unwrap_err();
        assert!(matches!(err, NormalizationError::NonexistentLocalTime(..)));
    }

    #[test]
    fn test_strict_requires_both_fragments() {
        let normalizer = TimeNormalizer::default();
        assert_eq!(
            normalizer.strict(None, Some(&RawDate::new("Jun", "6")), 2025),
            Err(NormalizationError::Missing("time range"))
        );
        assert_eq!(
            normalizer.strict(Some(&range("7:00 PM", "9:00 PM")), None, 2025),
            Err(NormalizationError::Missing("date"))
        );
    }

    #[test]
    fn test_lenient_defaults_when_everything_missing() {
        let reference = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        let window = TimeNormalizer::default().lenient(None, None, reference);

        assert_eq!(window.local_start().to_rfc3339(), "2025-06-06T19:00:00-06:00");
        assert_eq!(window.duration(), Duration::hours(3));
        assert_eq!(window.source_timezone(), chrono_tz::America::Denver);
    }

    #[test]
    fn test_lenient_keeps_good_pieces() {
        let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let window = TimeNormalizer::default().lenient(
            Some(&range("8:00 PM", "garbage")),
            Some(&RawDate::new("Jun", "13")),
            reference,
        );

        assert_eq!(window.local_start().to_rfc3339(), "2025-06-13T20:00:00-06:00");
        assert_eq!(window.duration(), Duration::hours(3));
    }

    #[test]
    fn test_lenient_matches_strict_on_good_input() {
        let normalizer = TimeNormalizer::default();
        let r = range("7:00 PM", "11:00 PM");
        let d = RawDate::new("Jun", "6");
        let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert_eq!(
            normalizer.lenient(Some(&r), Some(&d), reference),
            normalizer.strict(Some(&r), Some(&d), 2025).unwrap()
        );
    }

    /// Every half hour of the day on a 12-hour clock
    fn half_hours() -> Vec<(NaiveTime, String)> {
        (0..48)
            .map(|i| {
                let (hour, minute) = (i / 2, (i % 2) * 30);
                let shown_hour = if hour % 12 == 0 { 12 } else { hour % 12 };
                let meridiem = if hour < 12 { "AM" } else { "PM" };
                let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
                (time, format!("{}:{:02} {}", shown_hour, minute, meridiem))
            })
            .collect()
    }

    #[test]
    fn test_every_clock_pair_gives_forward_window() {
        let zone = chrono_tz::America::Denver;
        let dates = [("Mar", "9"), ("Nov", "2"), ("Jun", "6"), ("Dec", "31"), ("Feb", "28")];
        let clocks = half_hours();
        let normalizer = TimeNormalizer::default();
        let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        for (month, day) in dates {
            let date = RawDate::new(month, day);
            let calendar_day = parse_date(&date, 2025).unwrap();

            for (start, start_text) in &clocks {
                let in_gap = zone.from_local_datetime(&calendar_day.and_time(*start)).earliest().is_none();

                for (end, end_text) in &clocks {
                    let r = range(start_text, end_text);
                    let case = format!("{} {} {}-{}", month, day, start_text, end_text);

                    let lenient = normalizer.lenient(Some(&r), Some(&date), reference);
                    assert!(lenient.end() > lenient.start(), "lenient {}", case);
                    assert!(lenient.duration() <= Duration::hours(24), "lenient {}", case);

                    match normalize(&r, &date, 2025, "America/Denver") {
                        Ok(window) => {
                            assert!(start != end && !in_gap, "unexpected window for {}", case);
                            assert!(window.end() > window.start(), "{}", case);
                            assert!(window.duration() <= Duration::hours(24), "{}", case);
                            assert_eq!(window.local_start().date_naive(), calendar_day, "{}", case);
                        }
                        Err(NormalizationError::EmptyWindow(_)) => assert_eq!(start, end, "{}", case),
                        Err(NormalizationError::NonexistentLocalTime(..)) => assert!(in_gap, "{}", case),
                        Err(e) => panic!("{}: {}", case, e),
                    }
                }
            }
        }
    }
}
