//! Configuration management for pasito-sync.
//!
//! Configuration is read from `~/.config/pasito-sync/config.toml` at startup
//! (or the path given with `--config`). If the file doesn't exist, a default
//! configuration with comments is created. Credentials never live here; see
//! [`crate::publish::PublisherCredentials`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::assembler::TranslationConfig;
use crate::extract::ExtractorConfig;
use crate::fetcher::FetcherConfig;
use crate::normalizer::ScheduleDefaults;
use crate::publish::PublisherConfig;

/// The site events are scraped from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root; event pages live under `/e/`, series under `/es/`
    pub base_url: String,

    /// Country used for scraped addresses
    pub default_country: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pasito.fun".to_string(),
            default_country: crate::domain::DEFAULT_COUNTRY.to_string(),
        }
    }
}

/// Local files written by a run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where preview runs save the would-be API calls
    pub preview_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            preview_file: PathBuf::from("facebook_api_preview.txt"),
        }
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub extract: ExtractorConfig,
    pub fetcher: FetcherConfig,
    pub schedule: ScheduleDefaults,
    pub publisher: PublisherConfig,
    pub translation: TranslationConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    /// Load configuration from `path`, creating a commented default there if missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/pasito-sync/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pasito-sync").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> &'static str {
        r##"# pasito-sync configuration
#
# Publishing credentials are read from the environment (or a .env file):
#   FB_PAGE_ID, FB_PAGE_ACCESS_TOKEN

[site]
base_url = "https://pasito.fun"
default_country = "US"

[extract]
# Suffix the site appends to page titles ("Social · Pasito")
site_name = "Pasito"

# Path prefixes of venue pages, tried in order
venue_path_prefixes = ["/l/"]

# Marker in front of the date/time line
time_marker = "🕘"

# Words that open and close the description when scanning page text
description_triggers = ["every", "join", "welcome", "about"]
description_stoppers = ["website", "register", "sign in", "open options", "blog"]

# Link texts that suggest a venue page
venue_keywords = ["venue", "location", "address", "ballroom", "hall"]

# Words that rule out a "City, ST" line as a location
region_stopwords = ["series", "organizer", "social"]

[fetcher]
# Render pages in headless Chrome; plain HTTP is used when this is off
# or the browser fails
render = true
headless = true

# Navigation and readiness timeouts in seconds
navigation_timeout_secs = 30
ready_timeout_secs = 10

# Wait after the page shows text, for late dynamic content (milliseconds)
settle_delay_ms = 2500

# Timeout for plain HTTP fetches in seconds
static_timeout_secs = 10

# File the raw HTML is written to with --debug
debug_artifact = "debug_raw_html.html"

[schedule]
# Used when a page has no usable date or time (preview runs only)
timezone = "America/Denver"
start = "19:00"
duration_hours = 3

[publisher]
api_base = "https://graph.facebook.com"
api_version = "v20.0"

# Retries for network errors, 429 and 5xx responses
max_retries = 3
initial_backoff_ms = 200
timeout_secs = 30

[translation]
enabled = true
target = "en"

[output]
preview_file = "facebook_api_preview.txt"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
