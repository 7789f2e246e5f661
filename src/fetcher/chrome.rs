use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::RawPage;
use crate::fetcher::{FetchError, FetcherConfig, PageFetcher};

const STRATEGY: &str = "rendered";

const READY_SCRIPT: &str = "document.body ? document.body.innerText.trim().length : 0";
const TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";
const READY_POLL: Duration = Duration::from_millis(250);

/// Headless Chrome fetcher using chromiumoxide.
///
/// One browser session is shared by every fetch in a batch. Fetches take the
/// session lock, so pages are rendered one at a time. Call
/// [`ChromeFetcher::shutdown`] when the batch is done.
pub struct ChromeFetcher {
    browser: Mutex<Option<Browser>>,
    handler: StdMutex<Option<JoinHandle<()>>>,
    config: FetcherConfig,
}

impl ChromeFetcher {
    /// Launch a browser with the given configuration
    pub async fn launch(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--window-size=1920,1080");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder.build().map_err(|e| {
            FetchError::new("-", STRATEGY, format!("Failed to build browser config: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            FetchError::new(
                "-",
                STRATEGY,
                format!(
                    "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                    e
                ),
            )
        })?;

        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drive the CDP connection
            }
        });

        tracing::info!("Browser session started");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler: StdMutex::new(Some(handler)),
            config,
        })
    }

    /// Close the browser session. Later fetches fail with a FetchError.
    pub async fn shutdown(&self) {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!("Browser process wait failed: {}", e);
            }
            tracing::info!("Browser session closed");
        }

        let handler = self.handler.lock().ok().and_then(|mut h| h.take());
        if let Some(handler) = handler {
            handler.abort();
        }
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<RawPage, FetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::new(url, STRATEGY, format!("Failed to create page: {}", e)))?;

        let result = self.render_in(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", url, e);
        }

        result
    }

    async fn render_in(&self, page: &Page, url: &str) -> Result<RawPage, FetchError> {
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua.as_str())
                .await
                .map_err(|e| FetchError::new(url, STRATEGY, format!("Failed to set user agent: {}", e)))?;
        }

        let navigation = self.config.navigation_timeout();
        match tokio::time::timeout(navigation, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(FetchError::new(url, STRATEGY, format!("Navigation failed: {}", e)));
            }
            Err(_) => {
                return Err(FetchError::new(
                    url,
                    STRATEGY,
                    format!("Navigation timed out after {}s", navigation.as_secs()),
                ));
            }
        }

        if !wait_until_ready(page, self.config.ready_timeout()).await {
            tracing::warn!(
                "Timed out waiting for page body text on {}, reading what is there",
                url
            );
        }

        // Late dynamic content
        tokio::time::sleep(self.config.settle_delay()).await;

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::new(url, STRATEGY, format!("Failed to read document: {}", e)))?;

        let text: String = match page.evaluate(TEXT_SCRIPT).await {
            Ok(result) => result.into_value().unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Could not read visible text of {}: {}", url, e);
                String::new()
            }
        };

        tracing::debug!(
            "Rendered {} ({} bytes of HTML, {} chars of text)",
            url,
            html.len(),
            text.len()
        );

        Ok(RawPage::new(url, html).with_text(text))
    }
}

/// Poll until the body shows non-empty text or `limit` passes.
async fn wait_until_ready(page: &Page, limit: Duration) -> bool {
    let poll = async {
        loop {
            let visible = match page.evaluate(READY_SCRIPT).await {
                Ok(result) => result.into_value::<u64>().unwrap_or(0),
                Err(_) => 0,
            };
            if visible > 0 {
                return;
            }
            tokio::time::sleep(READY_POLL).await;
        }
    };

    tokio::time::timeout(limit, poll).await.is_ok()
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let guard = self.browser.lock().await;
        let Some(browser) = guard.as_ref() else {
            return Err(FetchError::new(url, STRATEGY, "Browser session is closed"));
        };

        self.render(browser, url).await
    }
}
