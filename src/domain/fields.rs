use serde::Serialize;

/// A value pulled from a page, tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extracted<T> {
    pub value: T,
    pub source: &'static str,
}

impl<T> Extracted<T> {
    pub fn new(value: T, source: &'static str) -> Self {
        Self { value, source }
    }
}

/// Start and end clock readings as they appear next to the time marker,
/// e.g. `("7:00 PM", "11:00 PM")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTimeRange {
    pub start: String,
    pub end: String,
}

impl RawTimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Month and day of month without a year, e.g. `Jun 6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawDate {
    pub weekday: Option<String>,
    pub month: String,
    pub day: String,
}

impl RawDate {
    pub fn new(month: impl Into<String>, day: impl Into<String>) -> Self {
        Self {
            weekday: None,
            month: month.into(),
            day: day.into(),
        }
    }
}

/// Unresolved pointer to where an event takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VenueReference {
    /// A venue page on the same site; resolvable to a full address
    Link { url: String, label: Option<String> },
    /// A `City, ST` label found in the page text
    Region { city: String, state: String },
}

impl VenueReference {
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Link { label, .. } => label.clone(),
            Self::Region { city, state } => Some(format!("{}, {}", city, state)),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link { url, .. } => Some(url),
            Self::Region { .. } => None,
        }
    }
}

/// Everything the extractors found on one event page.
///
/// Absence of any field is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub name: Option<Extracted<String>>,
    pub description: Option<Extracted<String>>,
    pub cover_image_url: Option<Extracted<String>>,
    pub raw_time_range: Option<Extracted<RawTimeRange>>,
    pub raw_date: Option<Extracted<RawDate>>,
    pub venue_reference: Option<Extracted<VenueReference>>,
    pub ticket_url: Option<Extracted<String>>,
}

impl ExtractedFields {
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|e| e.value.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().map(|e| e.value.as_str())
    }

    pub fn time_range(&self) -> Option<&RawTimeRange> {
        self.raw_time_range.as_ref().map(|e| &e.value)
    }

    pub fn date(&self) -> Option<&RawDate> {
        self.raw_date.as_ref().map(|e| &e.value)
    }

    pub fn venue(&self) -> Option<&VenueReference> {
        self.venue_reference.as_ref().map(|e| &e.value)
    }

    /// Names of the fields that came back empty, for logging
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_none()),
            ("description", self.description.is_none()),
            ("cover_image_url", self.cover_image_url.is_none()),
            ("time_range", self.raw_time_range.is_none()),
            ("date", self.raw_date.is_none()),
            ("venue", self.venue_reference.is_none()),
            ("ticket_url", self.ticket_url.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}
