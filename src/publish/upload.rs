use std::path::Path;

use reqwest::multipart::{Form, Part};

use super::retry::send_json;
use super::{PublishError, PublisherConfig, PublisherCredentials};

/// Uploads local images as unpublished page photos for use as event covers
pub struct ImageUploader {
    client: reqwest::Client,
    config: PublisherConfig,
    credentials: PublisherCredentials,
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

impl ImageUploader {
    pub fn new(config: PublisherConfig, credentials: PublisherCredentials) -> Result<Self, PublishError> {
        Ok(Self {
            client: config.client()?,
            config,
            credentials,
        })
    }

    /// Upload `path` and return the photo id.
    pub async fn upload(&self, path: &Path) -> Result<String, PublishError> {
        if !path.is_file() {
            return Err(PublishError::FileNotFound(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| PublishError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cover".to_string());
        let mime = mime_for(path);
        let url = self.config.endpoint(&self.credentials.page_id, "photos");

        tracing::info!("Uploading cover image {} ({} bytes)", path.display(), bytes.len());

        let reply = send_json(self.config.retry_policy(), "Cover upload", || {
            let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
            let part = match part.mime_str(mime) {
                Ok(part) => part,
                Err(_) => Part::bytes(bytes.clone()).file_name(file_name.clone()),
            };
            let form = Form::new().text("published", "false").part("source", part);
            self.client
                .post(&url)
                .bearer_auth(&self.credentials.access_token)
                .multipart(form)
        })
        .await?;

        let id = reply
            .get("id")
            .and_then(|id| id.as_str())
            .map(String::from)
            .ok_or_else(|| PublishError::Decode(format!("no photo id in {}", reply)))?;

        tracing::info!("Uploaded cover image as {}", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn uploader(api_base: String) -> ImageUploader {
        let config = PublisherConfig {
            api_base,
            initial_backoff_ms: 1,
            ..PublisherConfig::default()
        };
        ImageUploader::new(config, PublisherCredentials::new("12345", "token")).unwrap()
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("cover")), "image/jpeg");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.jpg");
        let err = uploader("http://127.0.0.1:9".into()).upload(&missing).await.unwrap_err();
        assert_eq!(err, PublishError::FileNotFound(missing));
    }

    #[tokio::test]
    async fn test_upload_returns_photo_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v20.0/12345/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "photo-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cover.png");
        std::fs::write(&image, b"\x89PNG fake").unwrap();

        let id = uploader(server.uri()).upload(&image).await.unwrap();
        assert_eq!(id, "photo-1");
    }
}
