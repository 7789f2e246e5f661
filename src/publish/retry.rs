use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::RequestBuilder;
use serde_json::Value;

use super::PublishError;

const MAX_BODY_SNIPPET: usize = 500;

/// Longest wait a server's `Retry-After` can impose
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// Delay before retry number `attempt` (1-based): initial × 2^(attempt-1)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }

    /// Delay before retry `attempt`, preferring the server's `Retry-After`
    /// up to the policy's whole backoff budget or one minute, whichever is
    /// longer.
    pub fn delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(wait) => wait.min(self.backoff(self.max_retries + 1).max(MAX_RETRY_AFTER)),
            None => self.backoff(attempt),
        }
    }
}

fn snip(body: &str) -> String {
    if body.len() <= MAX_BODY_SNIPPET {
        return body.to_string();
    }
    let mut end = MAX_BODY_SNIPPET;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}

/// Send the request built by `build`, retrying transient failures, and
/// decode a successful body as JSON.
///
/// `build` is called once per attempt since request bodies are consumed.
pub async fn send_json(
    policy: RetryPolicy,
    what: &str,
    build: impl Fn() -> RequestBuilder,
) -> Result<Value, PublishError> {
    let mut attempt = 0u32;

    loop {
        let (error, wait) = match build().send().await {
            Err(e) => (PublishError::Network(e.to_string()), None),
            Ok(response) => {
                let status = response.status();
                let wait = retry_after(&response);
                let body = response
                    .text()
                    .await
                    .map_err(|e| PublishError::Network(e.to_string()));

                match body {
                    Ok(body) if status.is_success() => {
                        return serde_json::from_str(&body)
                            .map_err(|e| PublishError::Decode(format!("{}: {}", e, snip(&body))));
                    }
                    Ok(body) => (
                        PublishError::Api {
                            status: status.as_u16(),
                            body: snip(&body),
                        },
                        wait,
                    ),
                    Err(e) => (e, None),
                }
            }
        };

        if !error.is_transient() || attempt >= policy.max_retries {
            tracing::debug!(attempt, "{} failed: {}", what, error);
            return Err(error);
        }

        attempt += 1;
        let delay = policy.delay(attempt, wait);
        tracing::warn!(
            attempt,
            max_retries = policy.max_retries,
            backoff_ms = delay.as_millis() as u64,
            "{} failed ({}), retrying",
            what,
            error
        );
        tokio::time::sleep(delay).await;
    }
}
