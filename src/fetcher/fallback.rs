use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::RawPage;
use crate::fetcher::{FetchError, PageFetcher};

/// Tries the rendered strategy first and falls back to a plain fetch.
pub struct FallbackFetcher {
    rendered: Option<Arc<dyn PageFetcher>>,
    plain: Arc<dyn PageFetcher>,
    debug_artifact: Option<PathBuf>,
}

impl FallbackFetcher {
    pub fn new(rendered: Option<Arc<dyn PageFetcher>>, plain: Arc<dyn PageFetcher>) -> Self {
        Self {
            rendered,
            plain,
            debug_artifact: None,
        }
    }

    /// Write the raw HTML of every fetched page to `path`
    pub fn with_debug_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_artifact = Some(path.into());
        self
    }

    async fn write_artifact(&self, page: &RawPage) {
        let Some(ref path) = self.debug_artifact else {
            return;
        };
        match tokio::fs::write(path, page.html.as_bytes()).await {
            Ok(()) => tracing::debug!(
                "Saved raw HTML of {} to {} ({} bytes)",
                page.url,
                path.display(),
                page.html.len()
            ),
            Err(e) => tracing::warn!("Could not save raw HTML to {}: {}", path.display(), e),
        }
    }
}

#[async_trait]
impl PageFetcher for FallbackFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let rendered_error = match &self.rendered {
            Some(rendered) => match rendered.fetch(url).await {
                Ok(page) => {
                    self.write_artifact(&page).await;
                    return Ok(page);
                }
                Err(e) => {
                    tracing::warn!("{}; falling back to plain fetch", e);
                    Some(e)
                }
            },
            None => None,
        };

        match self.plain.fetch(url).await {
            Ok(page) => {
                self.write_artifact(&page).await;
                Ok(page)
            }
            Err(plain_error) => match rendered_error {
                Some(rendered_error) => Err(FetchError::new(
                    url,
                    "rendered+static",
                    format!("{}; {}", rendered_error.cause, plain_error.cause),
                )),
                None => Err(plain_error),
            },
        }
    }

    async fn fetch_static(&self, url: &str) -> Result<RawPage, FetchError> {
        match self.plain.fetch(url).await {
            Ok(page) => Ok(page),
            Err(e) => match &self.rendered {
                Some(_) => {
                    tracing::warn!("{}; trying rendered fetch", e);
                    self.fetch(url).await
                }
                None => Err(e),
            },
        }
    }
}
