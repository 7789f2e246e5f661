//! Extracted fields + address + time window → [`EventRecord`].

pub mod translate;

pub use translate::{GoogleTranslator, NoopTranslator, TranslateError, TranslationConfig, Translator};

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{Address, CoverImage, EventRecord, ExtractedFields, Location, TimeWindow};

/// Placeholders used in preview runs; never published.
pub const PREVIEW_NAME: &str = "[preview] Untitled event";
pub const PREVIEW_DESCRIPTION: &str = "[preview] No description found on the event page.";
pub const PREVIEW_VENUE: &str = "[preview] Default Venue";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// How missing data is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Missing required data fails the event
    Strict,
    /// Missing required data is replaced by labeled placeholders
    Preview,
}

impl Mode {
    pub fn is_preview(self) -> bool {
        self == Mode::Preview
    }
}

fn preview_address() -> Address {
    Address::physical(PREVIEW_VENUE, "123 Main St", "Boulder", "CO", "80301")
}

pub fn attribution(source_url: &str) -> String {
    format!("This event was created from {}", source_url)
}

pub fn ticket_line(ticket_url: &str) -> String {
    format!("🎟️ Get tickets: {}", ticket_url)
}

pub struct EventAssembler {
    translator: Arc<dyn Translator>,
}

impl EventAssembler {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    pub async fn assemble(
        &self,
        fields: &ExtractedFields,
        address: Option<&Address>,
        time_window: TimeWindow,
        source_url: &str,
        mode: Mode,
    ) -> Result<EventRecord, AssemblyError> {
        let name = required(fields.name(), "name", mode, PREVIEW_NAME)?;

        let description = match fields.description().filter(|d| !d.trim().is_empty()) {
            Some(text) => self.translator.translate(text).await,
            None => required(None, "description", mode, PREVIEW_DESCRIPTION)?,
        };

        let location = match address {
            Some(address) => Location::from(address.clone()),
            None if mode.is_preview() => {
                tracing::warn!("No location found, using the preview placeholder venue");
                Location::from(preview_address())
            }
            None => return Err(AssemblyError::MissingField("location")),
        };

        let mut body = description.trim().to_string();
        if let Some(ticket) = fields.ticket_url.as_ref() {
            body.push_str("\n\n");
            body.push_str(&ticket_line(&ticket.value));
        }
        body.push_str("\n\n");
        body.push_str(&attribution(source_url));

        let cover = fields
            .cover_image_url
            .as_ref()
            .map(|c| CoverImage::Url(c.value.clone()));

        let record = EventRecord::new(name, body, time_window, location, cover, source_url.to_string());
        tracing::info!("Assembled '{}' ({})", record.name(), record.fingerprint());
        Ok(record)
    }
}

fn required(
    value: Option<&str>,
    field: &'static str,
    mode: Mode,
    placeholder: &str,
) -> Result<String, AssemblyError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None if mode.is_preview() => {
            tracing::warn!("No {} found, using a preview placeholder", field);
            Ok(placeholder.to_string())
        }
        None => Err(AssemblyError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Extracted, RawTimeRange};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    const SOURCE: &str = "https://pasito.fun/e/friday";

    struct Shouting;

    #[async_trait]
    impl Translator for Shouting {
        async fn translate(&self, text: &str) -> String {
            text.to_uppercase()
        }
    }

    fn window() -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2025, 6, 7, 1, 0, 0).unwrap();
        TimeWindow::new(start, start + Duration::hours(4), chrono_tz::America::Denver).unwrap()
    }

    fn fields() -> ExtractedFields {
        ExtractedFields {
            name: Some(Extracted::new("Friday Night Social".into(), "in_page_title")),
            description: Some(Extracted::new("Every week we dance.".into(), "meta_description")),
            cover_image_url: Some(Extracted::new("https://pasito.fun/img/c.png".into(), "og_image")),
            raw_time_range: Some(Extracted::new(RawTimeRange::new("7:00 PM", "11:00 PM"), "marker_time_range")),
            ..ExtractedFields::default()
        }
    }

    fn hall() -> Address {
        Address::physical("The Hall", "100 Main St", "Boulder", "CO", "80301")
    }

    fn assembler() -> EventAssembler {
        EventAssembler::new(Arc::new(NoopTranslator))
    }

    #[tokio::test]
    async fn test_assemble_strict() {
        let record = assembler()
            .assemble(&fields(), Some(&hall()), window(), SOURCE, Mode::Strict)
            .await
            .unwrap();

        assert_eq!(record.name(), "Friday Night Social");
        assert_eq!(
            record.description(),
            "Every week we dance.\n\nThis event was created from https://pasito.fun/e/friday"
        );
        assert_eq!(record.location(), &Location::Place(hall()));
        assert_eq!(record.cover(), Some(&CoverImage::Url("https://pasito.fun/img/c.png".into())));
        assert_eq!(record.source_url(), SOURCE);
    }

    #[tokio::test]
    async fn test_ticket_line_before_attribution() {
        let mut fields = fields();
        fields.ticket_url = Some(Extracted::new("https://tix.example.com/1".into(), "ticket_link"));

        let record = assembler()
            .assemble(&fields, Some(&hall()), window(), SOURCE, Mode::Strict)
            .await
            .unwrap();
        assert!(record.description().ends_with(
            "\n\n🎟️ Get tickets: https://tix.example.com/1\n\nThis event was created from https://pasito.fun/e/friday"
        ));
    }

    #[tokio::test]
    async fn test_translation_happens_before_attribution() {
        let record = EventAssembler::new(Arc::new(Shouting))
            .assemble(&fields(), Some(&hall()), window(), SOURCE, Mode::Strict)
            .await
            .unwrap();
        assert!(record.description().starts_with("EVERY WEEK WE DANCE."));
        assert!(record.description().ends_with(&attribution(SOURCE)));
    }

    #[tokio::test]
    async fn test_strict_missing_fields() {
        let a = assembler();

        let mut no_name = fields();
        no_name.name = None;
        assert_eq!(
            a.assemble(&no_name, Some(&hall()), window(), SOURCE, Mode::Strict).await,
            Err(AssemblyError::MissingField("name"))
        );

        let mut blank_description = fields();
        blank_description.description = Some(Extracted::new("   ".into(), "prose"));
        assert_eq!(
            a.assemble(&blank_description, Some(&hall()), window(), SOURCE, Mode::Strict).await,
            Err(AssemblyError::MissingField("description"))
        );

        assert_eq!(
            a.assemble(&fields(), None, window(), SOURCE, Mode::Strict).await,
            Err(AssemblyError::MissingField("location"))
        );
    }

    #[tokio::test]
    async fn test_preview_fills_placeholders() {
        let record = assembler()
            .assemble(&ExtractedFields::default(), None, window(), SOURCE, Mode::Preview)
            .await
            .unwrap();

        assert_eq!(record.name(), PREVIEW_NAME);
        assert!(record.description().starts_with(PREVIEW_DESCRIPTION));
        assert_eq!(record.location().place().map(|a| a.venue_name.as_str()), Some(PREVIEW_VENUE));
        assert_eq!(record.cover(), None);
    }

    #[tokio::test]
    async fn test_online_address_becomes_online_location() {
        let record = assembler()
            .assemble(&fields(), Some(&Address::online("Zoom")), window(), SOURCE, Mode::Strict)
            .await
            .unwrap();
        assert!(record.location().is_online());
        assert!(record.to_payload().place.is_none());
    }

    #[tokio::test]
    async fn test_assembly_is_repeatable() {
        let a = assembler();
        let first = a.assemble(&fields(), Some(&hall()), window(), SOURCE, Mode::Strict).await.unwrap();
        let second = a.assemble(&fields(), Some(&hall()), window(), SOURCE, Mode::Strict).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(
            serde_json::to_string(&first.to_payload()).unwrap(),
            serde_json::to_string(&second.to_payload()).unwrap()
        );
    }
}
