//! HTTP client wrapping reqwest.
//!
//! Every request carries a timeout. Connect errors, timeouts and 5xx are
//! retried with exponential backoff, 429 honours `Retry-After`. Any other
//! non-success status is an error.

use crate::error::{HarvestError, HarvestResult};
use std::time::Duration;

/// HTTP client for listing pages and documents.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a client with the given timeout, retry budget and user agent.
    pub fn new(timeout_ms: u64, max_retries: u32, user_agent: &str) -> HarvestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            max_retries,
        })
    }

    /// GET a page as text, with query parameters appended to the URL.
    pub async fn get_text(&self, url: &str, query: &[(&str, String)]) -> HarvestResult<String> {
        let resp = self.send(url, query).await?;
        Ok(resp.text().await?)
    }

    /// GET a document as raw bytes.
    pub async fn get_bytes(&self, url: &str) -> HarvestResult<Vec<u8>> {
        let resp = self.send(url, &[]).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn send(&self, url: &str, query: &[(&str, String)]) -> HarvestResult<reqwest::Response> {
        let mut retries = 0u32;

        loop {
            let resp = self.client.get(url).query(query).send().await;

            match resp {
                Ok(r) => {
                    let status = r.status().as_u16();

                    // Retry on 5xx
                    if status >= 500 && retries < self.max_retries {
                        retries += 1;
                        let delay = backoff(retries);
                        tracing::warn!("{url} returned {status}, retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    // Backoff on 429
                    if status == 429 && retries < self.max_retries {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        let delay = Duration::from_secs(retry_after.min(10));
                        tracing::warn!("{url} rate limited, retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if !r.status().is_success() {
                        return Err(HarvestError::Status {
                            url: r.url().to_string(),
                            status,
                        });
                    }

                    return Ok(r);
                }
                Err(e) => {
                    if retries < self.max_retries && (e.is_connect() || e.is_timeout()) {
                        retries += 1;
                        let delay = backoff(retries);
                        tracing::warn!("GET {url} failed: {e}, retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(attempt.saturating_sub(1)))
}
