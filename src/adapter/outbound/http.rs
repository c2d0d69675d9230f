//! Authority REST transport over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::error::TransportError;
use crate::infrastructure::config::authority::HttpConfig;
use crate::port::{Method, RequestTransport};

/// HTTP client rooted at the authority's API prefix.
pub struct HttpTransport {
    http: HttpClient,
    /// API root; always ends in `/` so relative paths join under it.
    api_url: Url,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl HttpTransport {
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            http: HttpClient::new(),
            api_url,
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(api_url: Url, config: &HttpConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            api_url,
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// Absolute URL for an API-relative `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MalformedResponse`] when `path` cannot be
    /// joined onto the API root.
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.api_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| TransportError::MalformedResponse {
                path: path.to_string(),
                reason: format!("invalid request path: {err}"),
            })
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            let delay = self.retry_backoff_ms.saturating_mul(1 << (attempt - 1).min(6));
            sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[async_trait]
impl RequestTransport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        let url = self.endpoint(path)?;
        let max_attempts = self.retry_max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(%method, url = %url, attempt, "Authority request");

            let request = match method {
                Method::Get => self.http.get(url.clone()),
                Method::Post => self.http.post(url.clone()),
            };
            let response = match request.query(params).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    path: path.to_string(),
                });
            }

            match response.json::<Value>().await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(TransportError::MalformedResponse {
                            path: path.to_string(),
                            reason: err.to_string(),
                        });
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }
}
