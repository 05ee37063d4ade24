//! Shared HTTP transport: retry, exponential backoff, timeout, and
//! status-code classification into `RemoteError`.

use std::time::Duration;

use reqwest::StatusCode;

use cpd_core::config::SyncConfig;
use cpd_core::errors::RemoteError;

/// Async HTTP client with a bounded retry loop. 5xx and transport
/// failures retry with doubling backoff; 4xx classify immediately and
/// never retry.
#[derive(Debug, Clone)]
pub(crate) struct RetryTransport {
    client: reqwest::Client,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryTransport {
    pub fn new(config: &SyncConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .build()
            .map_err(|e| RemoteError::Network {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Run a request, rebuilding it for each attempt. `collection`
    /// names what a 404 means on this route.
    pub async fn execute<F>(
        &self,
        collection: &str,
        build: F,
    ) -> Result<serde_json::Value, RemoteError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut backoff = self.initial_backoff;
        let mut last_err = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    attempt,
                    max = self.max_retries,
                    "cloud: retrying after {:?}",
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(self.max_backoff);
            }

            match build(&self.client).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp.json().await.map_err(|e| RemoteError::Network {
                            reason: format!("deserialization failed: {e}"),
                        });
                    }
                    if status.is_client_error() {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(classify_client_error(status, collection, body));
                    }
                    last_err = format!("HTTP {status}");
                }
                Err(e) => {
                    last_err = e.to_string();
                }
            }
        }

        Err(RemoteError::Network {
            reason: format!("all {} retries exhausted: {last_err}", self.max_retries),
        })
    }
}

fn classify_client_error(status: StatusCode, collection: &str, body: String) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized {
            reason: format!("HTTP {status}: {body}"),
        },
        StatusCode::NOT_FOUND => RemoteError::MissingCollection {
            collection: collection.to_string(),
        },
        StatusCode::BAD_REQUEST => RemoteError::Validation {
            reason: format!("HTTP {status}: {body}"),
        },
        _ => RemoteError::Network {
            reason: format!("HTTP {status}: {body}"),
        },
    }
}
