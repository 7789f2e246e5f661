//! Venue reference → postal address.
//!
//! A venue link is followed and its page parsed; a region label becomes a
//! city/state address; anything else falls back to a venue-only address, or
//! to an operator prompt when running interactively.

pub mod manual;
pub mod parse;

pub use manual::{prompt_location, Prompter, TerminalPrompter};
pub use parse::{classify_lines, clean_city, parse_venue_page, PostalParts, VenuePage};

use std::sync::{Arc, Mutex};

use crate::domain::{Address, VenueReference, DEFAULT_COUNTRY};
use crate::extract::ExtractorConfig;
use crate::fetcher::PageFetcher;

type SharedPrompter = Arc<Mutex<Box<dyn Prompter + Send>>>;

pub struct AddressResolver {
    fetcher: Arc<dyn PageFetcher>,
    extract: ExtractorConfig,
    default_country: String,
    prompter: Option<SharedPrompter>,
}

impl AddressResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, extract: ExtractorConfig) -> Self {
        Self {
            fetcher,
            extract,
            default_country: DEFAULT_COUNTRY.to_string(),
            prompter: None,
        }
    }

    pub fn with_default_country(mut self, country: impl Into<String>) -> Self {
        self.default_country = country.into();
        self
    }

    /// Allow prompting the operator on the terminal when nothing else works
    pub fn interactive(self, interactive: bool) -> Self {
        if interactive {
            self.with_prompter(TerminalPrompter::new())
        } else {
            Self { prompter: None, ..self }
        }
    }

    pub fn with_prompter(mut self, prompter: impl Prompter + Send + 'static) -> Self {
        let prompter: Box<dyn Prompter + Send> = Box::new(prompter);
        self.prompter = Some(Arc::new(Mutex::new(prompter)));
        self
    }

    /// Resolve a venue reference.
    ///
    /// `None` means nothing is known about the location, not even a name.
    pub async fn resolve(&self, venue: Option<&VenueReference>) -> Option<Address> {
        let address = match venue {
            None => self.manual(None).await,
            Some(VenueReference::Region { city, state }) => {
                let label = format!("{}, {}", city, state);
                tracing::info!("Using region label {} as location", label);
                Some(Address::physical(label, "", city.as_str(), state.as_str(), ""))
            }
            Some(VenueReference::Link { url, label }) => self.follow(url, label.as_deref()).await,
        };

        address.map(|a| {
            if a.is_online {
                a
            } else {
                a.with_country(self.default_country.as_str())
            }
        })
    }

    async fn follow(&self, url: &str, label: Option<&str>) -> Option<Address> {
        tracing::info!("Resolving venue address from {}", url);

        let venue = match self.fetcher.fetch(url).await {
            Ok(page) => parse_venue_page(&page, &self.extract),
            Err(e) => {
                tracing::warn!("Could not load venue page: {}", e);
                VenuePage::default()
            }
        };

        let name = label.map(String::from).or(venue.name);

        match (venue.postal, name) {
            (Some(postal), name) => {
                tracing::info!(
                    "Venue address: {}, {}, {} {}",
                    postal.street,
                    postal.city,
                    postal.state,
                    postal.zip
                );
                Some(Address::physical(
                    name.unwrap_or_else(|| "Venue".to_string()),
                    postal.street,
                    postal.city,
                    postal.state,
                    postal.zip,
                ))
            }
            (None, Some(name)) => {
                if let Some(address) = self.manual(Some(name.clone())).await {
                    return Some(address);
                }
                tracing::warn!("No address for {}, using the venue name only", name);
                Some(Address::venue_only(name))
            }
            (None, None) => self.manual(None).await,
        }
    }

    async fn manual(&self, venue_name: Option<String>) -> Option<Address> {
        let Some(prompter) = self.prompter.clone() else {
            tracing::debug!("No location found and manual input is disabled");
            return None;
        };

        let prompt = tokio::task::spawn_blocking(move || {
            let mut prompter = prompter
                .lock()
                .map_err(|_| std::io::Error::other("prompter lock poisoned"))?;
            prompt_location(&mut **prompter, venue_name.as_deref())
        });

        match prompt.await {
            Ok(Ok(address)) => address,
            Ok(Err(e)) => {
                tracing::warn!("Manual location input failed: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Manual location prompt did not finish: {}", e);
                None
            }
        }
    }
}
