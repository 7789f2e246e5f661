use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use super::EventPipeline;
use crate::app::{AppError, Result};
use crate::assembler::Mode;
use crate::domain::CoverImage;
use crate::publish::{render_preview, ImageUploader, PreviewWriter, PublishError, Publisher, PAGE_ID_VAR};

/// Cover image given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOverride {
    Url(String),
    File(PathBuf),
}

impl CoverOverride {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            CoverOverride::Url(raw.to_string())
        } else {
            CoverOverride::File(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub mode: Mode,
    pub cover: Option<CoverOverride>,
    /// Supplies the year for dates shown without one
    pub reference: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total events: {}", self.total)?;
        writeln!(f, "Successful: {}", self.succeeded)?;
        write!(f, "Failed: {}", self.failed)
    }
}

/// Runs the pipeline over a list of identifiers, one at a time.
///
/// A failure on one identifier is logged and counted; the rest still run.
pub struct BatchDriver {
    pipeline: EventPipeline,
    publisher: Option<Arc<dyn Publisher>>,
    uploader: Option<ImageUploader>,
    preview: Option<PreviewWriter>,
    preview_endpoint: String,
}

impl BatchDriver {
    pub fn new(pipeline: EventPipeline) -> Self {
        Self {
            pipeline,
            publisher: None,
            uploader: None,
            preview: None,
            preview_endpoint: format!("<{}>/events", PAGE_ID_VAR),
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.preview_endpoint = publisher.endpoint();
        self.publisher = Some(publisher);
        self
    }

    pub fn with_uploader(mut self, uploader: ImageUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Where preview blocks are saved, and the endpoint they show
    pub fn with_preview(mut self, writer: PreviewWriter, endpoint: impl Into<String>) -> Self {
        self.preview = Some(writer);
        if self.publisher.is_none() {
            self.preview_endpoint = endpoint.into();
        }
        self
    }

    pub fn pipeline(&self) -> &EventPipeline {
        &self.pipeline
    }

    pub async fn run(&self, event_ids: &[String], options: &BatchOptions) -> BatchSummary {
        let mut summary = BatchSummary {
            total: event_ids.len(),
            ..BatchSummary::default()
        };
        let cover = self.cover(options).await;

        for (i, event_id) in event_ids.iter().enumerate() {
            println!("\n[{}/{}] {}", i + 1, event_ids.len(), event_id);

            match self.process(event_id, options.mode, options.reference, cover.as_ref()).await {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    println!("{}", outcome);
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!("Failed to process {}: {}", event_id, e);
                    println!("Failed: {}", e);
                }
            }
        }

        summary
    }

    async fn process(
        &self,
        event_id: &str,
        mode: Mode,
        reference: NaiveDate,
        cover: Option<&CoverImage>,
    ) -> Result<Outcome> {
        let mut record = self.pipeline.build_record(event_id, mode, reference).await?;
        if let Some(cover) = cover {
            record = record.with_cover(Some(cover.clone()));
        }
        let payload = record.to_payload();

        if mode.is_preview() {
            let block = render_preview(&self.preview_endpoint, &payload);
            println!("{}", block);
            if let Some(ref writer) = self.preview {
                if let Err(e) = writer.append(&block) {
                    tracing::warn!("Could not save preview to {}: {}", writer.path().display(), e);
                }
            }
            return Ok(Outcome::Previewed(payload.name));
        }

        let publisher = self
            .publisher
            .as_ref()
            .ok_or(AppError::Publish(PublishError::MissingCredentials(PAGE_ID_VAR)))?;
        let id = publisher.publish(&payload).await?;
        Ok(Outcome::Published { name: payload.name, id })
    }

    /// Resolve the cover override once for the whole batch.
    async fn cover(&self, options: &BatchOptions) -> Option<CoverImage> {
        match options.cover.as_ref()? {
            CoverOverride::Url(url) => Some(CoverImage::Url(url.clone())),
            CoverOverride::File(path) if options.mode.is_preview() => {
                println!("Preview mode: cover image {} would be uploaded", path.display());
                Some(CoverImage::Uploaded(format!("<upload of {}>", path.display())))
            }
            CoverOverride::File(path) => {
                let Some(ref uploader) = self.uploader else {
                    tracing::warn!("No uploader configured, ignoring cover image {}", path.display());
                    return None;
                };
                match uploader.upload(path).await {
                    Ok(id) => Some(CoverImage::Uploaded(id)),
                    Err(e) => {
                        tracing::warn!("Cover upload failed, using page images instead: {}", e);
                        None
                    }
                }
            }
        }
    }
}

enum Outcome {
    Published { name: String, id: String },
    Previewed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Published { name, id } => write!(f, "Created event '{}' (id {})", name, id),
            Outcome::Previewed(name) => write!(f, "Previewed event '{}'", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::EventPayload;
    use crate::fetcher::testing::StaticPages;
    use crate::pipeline::tests::{event_page, pipeline, reference, VENUE_HTML};

    /// Fails for event names listed in `reject`
    #[derive(Default)]
    struct ScriptedPublisher {
        reject: Vec<String>,
        published: Mutex<Vec<EventPayload>>,
    }

    #[async_trait]
    impl Publisher for ScriptedPublisher {
        async fn publish(&self, payload: &EventPayload) -> std::result::Result<String, PublishError> {
            if self.reject.contains(&payload.name) {
                return Err(PublishError::Api {
                    status: 400,
                    body: "Invalid parameter".into(),
                });
            }
            let mut published = self.published.lock().unwrap();
            published.push(payload.clone());
            Ok(format!("fb-{}", published.len()))
        }

        fn endpoint(&self) -> String {
            "https://graph.example.com/v20.0/123/events".into()
        }
    }

    fn three_events() -> StaticPages {
        StaticPages::new()
            .with_page("https://pasito.fun/e/one", &event_page("Salsa One"))
            .with_page("https://pasito.fun/e/two", &event_page("Salsa Two"))
            .with_page("https://pasito.fun/e/three", &event_page("Salsa Three"))
            .with_page("https://pasito.fun/l/the-hall", VENUE_HTML)
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn options(mode: Mode) -> BatchOptions {
        BatchOptions {
            mode,
            cover: None,
            reference: reference(),
        }
    }

    #[tokio::test]
    async fn test_one_publish_failure_does_not_stop_batch() {
        let publisher = Arc::new(ScriptedPublisher {
            reject: vec!["Salsa Two".into()],
            ..ScriptedPublisher::default()
        });
        let driver = BatchDriver::new(pipeline(three_events())).with_publisher(publisher.clone());

        let summary = driver.run(&ids(&["one", "two", "three"]), &options(Mode::Strict)).await;

        assert_eq!(summary, BatchSummary { total: 3, succeeded: 2, failed: 1 });
        let names: Vec<String> = publisher.published.lock().unwrap().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Salsa One", "Salsa Three"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_counts_as_failed() {
        let publisher = Arc::new(ScriptedPublisher::default());
        let driver = BatchDriver::new(pipeline(three_events())).with_publisher(publisher);

        let summary = driver.run(&ids(&["one", "missing"]), &options(Mode::Strict)).await;
        assert_eq!(summary, BatchSummary { total: 2, succeeded: 1, failed: 1 });
    }

    #[tokio::test]
    async fn test_strict_without_publisher_fails_each_event() {
        let driver = BatchDriver::new(pipeline(three_events()));
        let summary = driver.run(&ids(&["one"]), &options(Mode::Strict)).await;
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_preview_writes_file_and_applies_cover_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facebook_api_preview.txt");
        let writer = PreviewWriter::create(&path).unwrap();
        let driver = BatchDriver::new(pipeline(three_events()))
            .with_preview(writer, "https://graph.facebook.com/v20.0/<FB_PAGE_ID>/events");

        let mut opts = options(Mode::Preview);
        opts.cover = Some(CoverOverride::parse("https://cdn.example.com/flyer.png"));
        let summary = driver.run(&ids(&["one", "two"]), &opts).await;

        assert_eq!(summary, BatchSummary { total: 2, succeeded: 2, failed: 0 });
        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(saved.matches("API call preview").count(), 2);
        assert!(saved.contains("\"cover\": \"https://cdn.example.com/flyer.png\""));
        assert!(saved.contains("POST https://graph.facebook.com/v20.0/<FB_PAGE_ID>/events"));
    }

    #[tokio::test]
    async fn test_preview_shows_local_cover_without_uploading() {
        let driver = BatchDriver::new(pipeline(three_events()));
        let mut opts = options(Mode::Preview);
        opts.cover = Some(CoverOverride::parse("flyer.jpg"));

        assert_eq!(
            driver.cover(&opts).await,
            Some(CoverImage::Uploaded("<upload of flyer.jpg>".into()))
        );
    }

    #[test]
    fn test_cover_override_parse() {
        assert_eq!(
            CoverOverride::parse(" https://x.example.com/a.png "),
            CoverOverride::Url("https://x.example.com/a.png".into())
        );
        assert_eq!(
            CoverOverride::parse("./flyer.jpg"),
            CoverOverride::File(PathBuf::from("./flyer.jpg"))
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = BatchSummary { total: 3, succeeded: 2, failed: 1 };
        assert_eq!(summary.to_string(), "Total events: 3\nSuccessful: 2\nFailed: 1");
    }
}
