use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// Absolute start and end instants of an event.
///
/// `end > start` always holds for values built through [`TimeWindow::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    source_timezone: Tz,
}

impl TimeWindow {
    /// Returns `None` when `end` is not after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, source_timezone: Tz) -> Option<Self> {
        (end > start).then_some(Self {
            start,
            end,
            source_timezone,
        })
    }

    /// Window of `length` from `start`; lengths under a minute become a minute.
    pub fn starting_at(start: DateTime<Utc>, length: Duration, source_timezone: Tz) -> Self {
        Self {
            start,
            end: start + length.max(Duration::minutes(1)),
            source_timezone,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn source_timezone(&self) -> Tz {
        self.source_timezone
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn local_start(&self) -> DateTime<Tz> {
        self.start.with_timezone(&self.source_timezone)
    }

    pub fn local_end(&self) -> DateTime<Tz> {
        self.end.with_timezone(&self.source_timezone)
    }
}
