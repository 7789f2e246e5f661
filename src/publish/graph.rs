use async_trait::async_trait;

use super::retry::send_json;
use super::{PublishError, Publisher, PublisherConfig, PublisherCredentials};
use crate::domain::EventPayload;

/// Creates events on a page through the Graph API
pub struct GraphApiPublisher {
    client: reqwest::Client,
    config: PublisherConfig,
    credentials: PublisherCredentials,
}

impl GraphApiPublisher {
    pub fn new(config: PublisherConfig, credentials: PublisherCredentials) -> Result<Self, PublishError> {
        Ok(Self {
            client: config.client()?,
            config,
            credentials,
        })
    }
}

#[async_trait]
impl Publisher for GraphApiPublisher {
    async fn publish(&self, payload: &EventPayload) -> Result<String, PublishError> {
        let url = self.endpoint();
        tracing::info!("Creating event '{}'", payload.name);

        let reply = send_json(self.config.retry_policy(), "Event creation", || {
            self.client
                .post(&url)
                .bearer_auth(&self.credentials.access_token)
                .json(payload)
        })
        .await?;

        let id = reply
            .get("id")
            .and_then(|id| id.as_str())
            .map(String::from)
            .ok_or_else(|| PublishError::Decode(format!("no event id in {}", reply)))?;

        tracing::info!("Created event {}", id);
        Ok(id)
    }

    fn endpoint(&self) -> String {
        self.config.endpoint(&self.credentials.page_id, "events")
    }
}
