use std::sync::Arc;

use crate::app::error::Result;
use crate::assembler::{GoogleTranslator, NoopTranslator, Translator};
use crate::config::Config;
use crate::fetcher::{ChromeFetcher, FallbackFetcher, FetcherConfig, HttpFetcher, PageFetcher};
use crate::pipeline::{BatchDriver, EventPipeline};
use crate::publish::{GraphApiPublisher, ImageUploader, PreviewWriter, PublisherCredentials, PAGE_ID_VAR};

/// Run-wide switches that come from the command line rather than the config file
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    pub preview: bool,
    pub debug: bool,
    pub static_only: bool,
    pub interactive: bool,
}

pub struct AppContext {
    pub config: Config,
    pub flags: RunFlags,
    pub driver: BatchDriver,
    browser: Option<Arc<ChromeFetcher>>,
}

impl AppContext {
    /// Wire fetchers, pipeline, and publisher for one run.
    ///
    /// Non-preview runs need credentials; a preview run never touches the
    /// events API.
    pub async fn new(config: Config, flags: RunFlags) -> Result<Self> {
        let fetcher_config = if flags.static_only {
            FetcherConfig {
                render: false,
                ..config.fetcher.clone()
            }
        } else {
            config.fetcher.clone()
        };

        let plain: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&fetcher_config)?);
        let browser = if fetcher_config.render {
            match ChromeFetcher::launch(fetcher_config.clone()).await {
                Ok(browser) => Some(Arc::new(browser)),
                Err(e) => {
                    tracing::warn!("{}; continuing with plain HTTP fetches", e);
                    None
                }
            }
        } else {
            None
        };

        let mut fallback = FallbackFetcher::new(
            browser.clone().map(|b| b as Arc<dyn PageFetcher>),
            plain,
        );
        if flags.debug {
            fallback = fallback.with_debug_artifact(&fetcher_config.debug_artifact);
        }

        let translator: Arc<dyn Translator> = if config.translation.enabled {
            match GoogleTranslator::new(&config.translation) {
                Ok(t) => Arc::new(t),
                Err(e) => {
                    tracing::warn!("Translation disabled: {}", e);
                    Arc::new(NoopTranslator)
                }
            }
        } else {
            Arc::new(NoopTranslator)
        };

        let pipeline = EventPipeline::new(Arc::new(fallback), &config, translator, flags.interactive);
        let mut driver = BatchDriver::new(pipeline);

        if flags.preview {
            let page_id = PublisherCredentials::from_env()
                .map(|c| c.page_id)
                .unwrap_or_else(|_| format!("<{}>", PAGE_ID_VAR));
            let endpoint = config.publisher.endpoint(&page_id, "events");
            let writer = PreviewWriter::create(&config.output.preview_file)?;
            driver = driver.with_preview(writer, endpoint);
        } else {
            let credentials = PublisherCredentials::from_env()?;
            let publisher = GraphApiPublisher::new(config.publisher.clone(), credentials.clone())?;
            let uploader = ImageUploader::new(config.publisher.clone(), credentials)?;
            driver = driver.with_publisher(Arc::new(publisher)).with_uploader(uploader);
        }

        Ok(Self {
            config,
            flags,
            driver,
            browser,
        })
    }

    /// Close the browser session, if one was started.
    pub async fn shutdown(&self) {
        if let Some(ref browser) = self.browser {
            browser.shutdown().await;
        }
    }
}
