//! One event: fetch → extract → resolve address + normalize time → assemble.
//!
//! The steps run strictly in that order. [`batch::BatchDriver`] runs the
//! pipeline over many identifiers and publishes or previews each result.

pub mod batch;

pub use batch::{BatchDriver, BatchOptions, BatchSummary, CoverOverride};

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::address::AddressResolver;
use crate::app::{AppError, Result};
use crate::assembler::{EventAssembler, Mode, Translator};
use crate::config::Config;
use crate::domain::ids::{event_slug, event_url, series_slug, series_url};
use crate::domain::EventRecord;
use crate::extract::{event_slugs, Extractor};
use crate::fetcher::PageFetcher;
use crate::normalizer::TimeNormalizer;

pub struct EventPipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Extractor,
    resolver: AddressResolver,
    normalizer: TimeNormalizer,
    assembler: EventAssembler,
    base_url: String,
}

impl EventPipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        config: &Config,
        translator: Arc<dyn Translator>,
        interactive: bool,
    ) -> Self {
        let resolver = AddressResolver::new(fetcher.clone(), config.extract.clone())
            .with_default_country(config.site.default_country.as_str())
            .interactive(interactive);

        Self {
            fetcher,
            extractor: Extractor::new(config.extract.clone()),
            resolver,
            normalizer: TimeNormalizer::new(config.schedule.clone()),
            assembler: EventAssembler::new(translator),
            base_url: config.site.base_url.clone(),
        }
    }

    pub fn fetcher(&self) -> &Arc<dyn PageFetcher> {
        &self.fetcher
    }

    pub fn event_url(&self, event_id: &str) -> Result<String> {
        let slug = event_slug(event_id).ok_or_else(|| AppError::InvalidId(event_id.to_string()))?;
        Ok(event_url(&self.base_url, &slug))
    }

    /// Build the record for one event.
    ///
    /// `reference` supplies the year for dates shown without one, and the
    /// fallback date in preview mode.
    pub async fn build_record(&self, event_id: &str, mode: Mode, reference: NaiveDate) -> Result<EventRecord> {
        let url = self.event_url(event_id)?;
        tracing::info!("Processing {}", url);

        let page = self.fetcher.fetch(&url).await?;
        let fields = self.extractor.extract(&page);
        drop(page);

        let address = self.resolver.resolve(fields.venue()).await;

        let window = match mode {
            Mode::Strict => self
                .normalizer
                .strict(fields.time_range(), fields.date(), reference.year())?,
            Mode::Preview => self
                .normalizer
                .lenient(fields.time_range(), fields.date(), reference),
        };
        tracing::info!(
            "Event time: {} to {} ({})",
            window.local_start().format("%Y-%m-%d %H:%M"),
            window.local_end().format("%Y-%m-%d %H:%M"),
            window.source_timezone().name()
        );

        let record = self
            .assembler
            .assemble(&fields, address.as_ref(), window, &url, mode)
            .await?;
        Ok(record)
    }

    /// Event identifiers listed on a series page, in page order.
    pub async fn expand_series(&self, series_id: &str) -> Result<Vec<String>> {
        let slug = series_slug(series_id).ok_or_else(|| AppError::InvalidId(series_id.to_string()))?;
        let url = series_url(&self.base_url, &slug);
        tracing::info!("Listing events of series {}", url);

        let page = self.fetcher.fetch_static(&url).await?;
        let slugs = event_slugs(&page);
        if slugs.is_empty() {
            tracing::warn!("No events found on {}", url);
        } else {
            tracing::info!("Found {} events in series {}", slugs.len(), slug);
        }
        Ok(slugs)
    }
}
