use chrono::SecondsFormat;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{Address, Location, TimeWindow};

/// Cover image attached to a published event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverImage {
    /// Remote image referenced by URL
    Url(String),
    /// Handle returned by the image upload endpoint
    Uploaded(String),
}

impl CoverImage {
    pub fn reference(&self) -> &str {
        match self {
            CoverImage::Url(url) => url,
            CoverImage::Uploaded(id) => id,
        }
    }
}

/// Canonical event, ready for publishing. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    name: String,
    description: String,
    time_window: TimeWindow,
    location: Location,
    cover: Option<CoverImage>,
    source_url: String,
}

impl EventRecord {
    pub(crate) fn new(
        name: String,
        description: String,
        time_window: TimeWindow,
        location: Location,
        cover: Option<CoverImage>,
        source_url: String,
    ) -> Self {
        Self {
            name,
            description,
            time_window,
            location,
            cover,
            source_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn cover(&self) -> Option<&CoverImage> {
        self.cover.as_ref()
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Same record with a different cover image
    pub fn with_cover(&self, cover: Option<CoverImage>) -> Self {
        Self {
            cover,
            ..self.clone()
        }
    }

    /// Request body for the events API
    pub fn to_payload(&self) -> EventPayload {
        let (is_online, place) = match &self.location {
            Location::Online => (true, None),
            Location::Place(address) => (false, Some(PlacePayload::from(address))),
        };

        EventPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            start_time: self
                .time_window
                .start()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            end_time: self
                .time_window
                .end()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            event_time_zone: self.time_window.source_timezone().name().to_string(),
            is_online,
            place,
            cover: self.cover.as_ref().map(|c| c.reference().to_string()),
        }
    }

    /// Hex SHA-256 of the serialized payload
    pub fn fingerprint(&self) -> String {
        let body = serde_json::to_vec(&self.to_payload()).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&body);
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    pub name: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub event_time_zone: String,
    pub is_online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<PlacePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacePayload {
    pub name: String,
    pub location: PostalPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalPayload {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl From<&Address> for PlacePayload {
    fn from(address: &Address) -> Self {
        Self {
            name: address.venue_name.clone(),
            location: PostalPayload {
                street: address.street.clone(),
                city: address.city.clone(),
                state: address.state.clone(),
                zip: address.zip.clone(),
                country: address.country.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample(location: Location) -> EventRecord {
        let start = Utc.with_ymd_and_hms(2025, 6, 7, 1, 0, 0).unwrap();
        let window =
            TimeWindow::new(start, start + Duration::hours(4), chrono_tz::America::Denver).unwrap();
        EventRecord::new(
            "Friday Night Social".into(),
            "Every week we dance.".into(),
            window,
            location,
            None,
            "https://pasito.fun/e/friday".into(),
        )
    }

    #[test]
    fn test_payload_for_place() {
        let record = sample(Location::Place(Address::physical(
            "The Hall",
            "100 Main St",
            "Boulder",
            "CO",
            "80301",
        )));
        let json = serde_json::to_value(record.to_payload()).unwrap();

        assert_eq!(json["start_time"], "2025-06-07T01:00:00Z");
        assert_eq!(json["end_time"], "2025-06-07T05:00:00Z");
        assert_eq!(json["is_online"], false);
        assert_eq!(json["place"]["name"], "The Hall");
        assert_eq!(json["place"]["location"]["zip"], "80301");
        assert_eq!(json["place"]["location"]["country"], "US");
        assert!(json.get("cover").is_none());
    }

    #[test]
    fn test_payload_for_online() {
        let record = sample(Location::Online);
        let json = serde_json::to_value(record.to_payload()).unwrap();
        assert_eq!(json["is_online"], true);
        assert!(json.get("place").is_none());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = sample(Location::Online);
        let b = sample(Location::Online);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = a.with_cover(Some(CoverImage::Uploaded("123".into())));
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(c.to_payload().cover.as_deref(), Some("123"));
    }
}
