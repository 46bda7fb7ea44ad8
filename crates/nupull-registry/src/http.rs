//! Shared HTTP client and GET with retries.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::RegistryError;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Client settings taken from `[download]` in the global config.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub timeout: Duration,
    /// Attempts after the first one.
    pub retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            retries: 3,
        }
    }
}

/// Build a shared reqwest client for registry calls.
pub fn build_client(settings: &HttpSettings) -> Result<Client, RegistryError> {
    Client::builder()
        .timeout(settings.timeout)
        .user_agent(concat!("nupull/", env!("CARGO_PKG_VERSION")))
        .gzip(true)
        .build()
        .map_err(|e| RegistryError::Network {
            url: String::new(),
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// Delay before retry number `attempt` (1-based): 500ms, 1s, 2s, ...
fn backoff(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * 2u32.saturating_pow(attempt.saturating_sub(1))
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// GET a URL, retrying connect errors, timeouts, 429 and 5xx.
///
/// Returns `Ok(None)` for 404.
pub async fn get(
    client: &Client,
    url: &str,
    retries: u32,
) -> Result<Option<Response>, RegistryError> {
    let mut last_err = String::new();

    for attempt in 0..=retries {
        if attempt > 0 {
            let delay = backoff(attempt);
            tracing::debug!("Retrying {url} in {delay:?} (attempt {attempt}): {last_err}");
            tokio::time::sleep(delay).await;
        }

        match client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if is_retryable(status) {
                    last_err = format!("HTTP {status}");
                    continue;
                }
                if !status.is_success() {
                    return Err(RegistryError::Network {
                        url: url.to_string(),
                        message: format!("HTTP {status}"),
                    });
                }
                return Ok(Some(resp));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = e.to_string();
                continue;
            }
            Err(e) => {
                return Err(RegistryError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    Err(RegistryError::Network {
        url: url.to_string(),
        message: format!("failed after {} attempts: {last_err}", retries + 1),
    })
}

/// GET and decode a JSON document. Returns `Ok(None)` for 404.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    retries: u32,
) -> Result<Option<T>, RegistryError> {
    let Some(resp) = get(client, url, retries).await? else {
        return Ok(None);
    };
    let body = resp.bytes().await.map_err(|e| RegistryError::Network {
        url: url.to_string(),
        message: format!("Failed to read response: {e}"),
    })?;
    serde_json::from_slice(&body)
        .map(Some)
        .map_err(|e| RegistryError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
}
