use async_trait::async_trait;
use reqwest::Client;

use crate::domain::RawPage;
use crate::fetcher::{FetchError, FetcherConfig, PageFetcher};

const STRATEGY: &str = "static";

/// Plain GET fetcher. Sees only server-rendered HTML.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(config.static_timeout())
            .gzip(true)
            .brotli(true);

        builder = match &config.user_agent {
            Some(ua) => builder.user_agent(ua.clone()),
            None => builder.user_agent(concat!("pasito-sync/", env!("CARGO_PKG_VERSION"))),
        };

        let client = builder
            .build()
            .map_err(|e| FetchError::new("-", STRATEGY, format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, STRATEGY, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| FetchError::new(url, STRATEGY, e))?;

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, STRATEGY, e))?;

        tracing::debug!("Fetched {} ({} bytes, static)", url, html.len());
        Ok(RawPage::new(url, html))
    }
}
