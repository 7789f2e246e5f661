use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Translation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translate descriptions that are not in the target language (default: true)
    pub enabled: bool,

    /// Target language code (default: en)
    pub target: String,

    /// Translation endpoint
    pub endpoint: String,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: "en".to_string(),
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Why a translation request produced no usable reply
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("invalid translation endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation service answered HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Best-effort translation.
///
/// Implementations never fail: on any problem they log and hand back the
/// input unchanged.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> String;
}

/// Leaves text as it is
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Google's public translate endpoint with automatic source detection
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            target: config.target.clone(),
        })
    }

    async fn request(&self, text: &str) -> Result<Value, TranslateError> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ],
        )?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TranslateError::Status(response.status()));
        }
        Ok(response.json::<Value>().await?)
    }
}

/// Translated text and detected source language from a `translate_a` reply:
/// `[[["Hello","Hola",...],...],null,"es",...]`
pub fn parse_reply(reply: &Value) -> Option<(String, Option<String>)> {
    let segments = reply.get(0)?.as_array()?;
    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0)?.as_str())
        .collect();
    if translated.trim().is_empty() {
        return None;
    }
    let detected = reply.get(2).and_then(Value::as_str).map(String::from);
    Some((translated, detected))
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let reply = match self.request(text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Could not translate description, keeping the original: {}", e);
                return text.to_string();
            }
        };

        match parse_reply(&reply) {
            Some((_, Some(source))) if source.eq_ignore_ascii_case(&self.target) => text.to_string(),
            Some((translated, source)) => {
                tracing::info!(
                    "Translated description from {} to {}",
                    source.as_deref().unwrap_or("unknown"),
                    self.target
                );
                translated
            }
            None => {
                tracing::warn!("Unexpected translation reply, keeping the original");
                text.to_string()
            }
        }
    }
}
