use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for page fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Render pages in headless Chrome (default: true)
    pub render: bool,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Navigation timeout in seconds (default: 30)
    pub navigation_timeout_secs: u64,

    /// How long to wait for the body to show text, in seconds (default: 10)
    pub ready_timeout_secs: u64,

    /// Wait after the page is ready for late dynamic content, in milliseconds (default: 2500)
    pub settle_delay_ms: u64,

    /// Timeout for plain HTTP fetches in seconds (default: 10)
    pub static_timeout_secs: u64,

    /// File the raw HTML of each fetched page is written to in debug mode
    pub debug_artifact: String,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            render: true,
            headless: true,
            navigation_timeout_secs: 30,
            ready_timeout_secs: 10,
            settle_delay_ms: 2500,
            static_timeout_secs: 10,
            debug_artifact: "debug_raw_html.html".to_string(),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl FetcherConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn static_timeout(&self) -> Duration {
        Duration::from_secs(self.static_timeout_secs)
    }

    /// Plain HTTP only, no browser
    pub fn static_only() -> Self {
        Self {
            render: false,
            ..Default::default()
        }
    }
}
