//! # pasito-sync
//!
//! Copies dance events from Pasito pages to a Facebook page.
//!
//! ## Architecture
//!
//! Each event runs through the same pipeline:
//!
//! ```text
//! PageFetcher → Extractor → AddressResolver + TimeNormalizer → EventAssembler → Publisher
//! ```
//!
//! - [`fetcher`]: headless Chrome rendering with a plain HTTP fallback
//! - [`extract`]: ordered heuristic strategies per field
//! - [`address`]: venue page parsing and manual entry
//! - [`normalizer`]: wall-clock text to zone-aware instants
//! - [`assembler`]: validation, translation, and the final record
//! - [`publish`]: Graph API client, image upload, dry-run preview
//!
//! ## Quick Start
//!
//! ```bash
//! # Preview two events without sending anything
//! pasito-sync --preview @friday-social https://pasito.fun/e/salsa-night
//!
//! # Publish every event of a series with a custom cover
//! pasito-sync --series weekly-bachata --cover flyer.jpg
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires fetchers, pipeline, and publisher
/// for one run.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/pasito-sync/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`RawPage`](domain::RawPage): fetched HTML and visible text
/// - [`ExtractedFields`](domain::ExtractedFields): raw field values with provenance
/// - [`TimeWindow`](domain::TimeWindow): zone-aware start and end
/// - [`EventRecord`](domain::EventRecord): the publishable event
pub mod domain;

/// Page fetching strategies.
pub mod fetcher;

/// Field extraction from event pages.
pub mod extract;

/// Venue address resolution.
pub mod address;

/// Date and time normalization.
pub mod normalizer;

/// Event record assembly.
pub mod assembler;

/// Publishing and preview.
pub mod publish;

/// Per-event pipeline and batch driver.
pub mod pipeline;
