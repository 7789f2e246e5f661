//! Publishing assembled events to a Graph-style events API.
//!
//! - [`GraphApiPublisher`]: `POST {base}/{version}/{page_id}/events`
//! - [`ImageUploader`]: unpublished photo upload used as a cover image
//! - [`preview`]: the would-be request, rendered for dry runs
//!
//! Both network clients retry network failures, 429 and 5xx responses with
//! exponential backoff; other rejections are returned at once.

pub mod graph;
pub mod preview;
pub mod retry;
pub mod upload;

pub use graph::GraphApiPublisher;
pub use preview::{render_preview, PreviewWriter};
pub use retry::RetryPolicy;
pub use upload::ImageUploader;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EventPayload;

pub const PAGE_ID_VAR: &str = "FB_PAGE_ID";
pub const ACCESS_TOKEN_VAR: &str = "FB_PAGE_ACCESS_TOKEN";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("{0} is not set; add it to the environment or a .env file")]
    MissingCredentials(&'static str),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not read {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected API response: {0}")]
    Decode(String),
}

impl PublishError {
    /// Worth another attempt: network failures, rate limiting, server errors
    pub fn is_transient(&self) -> bool {
        match self {
            PublishError::Network(_) => true,
            PublishError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Events API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// API root (default: https://graph.facebook.com)
    pub api_base: String,

    /// API version path segment (default: v20.0)
    pub api_version: String,

    /// Retries after the first attempt for transient failures (default: 3)
    pub max_retries: u32,

    /// First backoff delay in milliseconds, doubled per retry (default: 200)
    pub initial_backoff_ms: u64,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            api_base: "https://graph.facebook.com".to_string(),
            api_version: "v20.0".to_string(),
            max_retries: 3,
            initial_backoff_ms: 200,
            timeout_secs: 30,
        }
    }
}

impl PublisherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.initial_backoff_ms))
    }

    /// `{base}/{version}/{page_id}/{edge}`
    pub fn endpoint(&self, page_id: &str, edge: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            page_id,
            edge
        )
    }

    pub(crate) fn client(&self) -> Result<reqwest::Client, PublishError> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .build()
            .map_err(|e| PublishError::Network(format!("Failed to build HTTP client: {}", e)))
    }
}

/// Page identity and token for the events API. Never stored in the config file.
#[derive(Clone, PartialEq, Eq)]
pub struct PublisherCredentials {
    pub page_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for PublisherCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherCredentials")
            .field("page_id", &self.page_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl PublisherCredentials {
    pub fn new(page_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Read `FB_PAGE_ID` and `FB_PAGE_ACCESS_TOKEN`, loading `.env` first.
    pub fn from_env() -> Result<Self, PublishError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PublishError> {
        let get = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(PublishError::MissingCredentials(key))
        };
        Ok(Self::new(get(PAGE_ID_VAR)?, get(ACCESS_TOKEN_VAR)?))
    }
}

/// Destination for assembled events
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Create the event and return its id.
    async fn publish(&self, payload: &EventPayload) -> Result<String, PublishError>;

    /// Endpoint shown in previews
    fn endpoint(&self) -> String;
}
