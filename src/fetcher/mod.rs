//! Page fetching.
//!
//! Two strategies produce a [`RawPage`]:
//!
//! - [`HttpFetcher`]: a plain GET; fast, but sees only server-rendered HTML
//! - [`ChromeFetcher`]: headless Chrome via chromiumoxide; sees client-rendered
//!   content and the page's visible text
//!
//! [`FallbackFetcher`] prefers the rendered strategy and drops to the plain
//! one when the browser is unavailable or a render fails.

pub mod chrome;
pub mod config;
pub mod fallback;
pub mod http_fetcher;

pub use chrome::ChromeFetcher;
pub use config::FetcherConfig;
pub use fallback::FallbackFetcher;
pub use http_fetcher::HttpFetcher;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RawPage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{strategy} fetch of {url} failed: {cause}")]
pub struct FetchError {
    pub url: String,
    pub strategy: &'static str,
    pub cause: String,
}

impl FetchError {
    pub fn new(url: &str, strategy: &'static str, cause: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            strategy,
            cause: cause.to_string(),
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page. Failures are returned, never panicked on.
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError>;

    /// Fetch a page whose content is known to be server-rendered.
    ///
    /// Defaults to [`PageFetcher::fetch`].
    async fn fetch_static(&self, url: &str) -> Result<RawPage, FetchError> {
        self.fetch(url).await
    }
}
