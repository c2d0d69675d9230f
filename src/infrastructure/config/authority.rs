//! Authority endpoint and HTTP client configuration.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Result};

/// Where the authority lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorityConfig {
    /// Root URL of the authority, `http` or `https`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefix of the request/response API.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Path of the push endpoint.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_api_prefix() -> String {
    "/api".into()
}

fn default_ws_path() -> String {
    "/ws".into()
}

impl AuthorityConfig {
    /// Parsed base URL, restricted to `http` and `https`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty, unparseable or non-HTTP URL.
    pub fn base(&self) -> Result<Url> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        let url = Url::parse(self.base_url.trim()).map_err(|e| ConfigError::InvalidValue {
            field: "base_url",
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: format!("unsupported scheme '{other}', expected http or https"),
            }
            .into()),
        }
    }

    /// Root of the request/response API, always ending in `/`.
    ///
    /// # Errors
    ///
    /// See [`AuthorityConfig::base`].
    pub fn api_url(&self) -> Result<Url> {
        let base = self.base()?;
        Ok(join_path(&base, &self.api_prefix, true))
    }

    /// Push endpoint: the base URL with `http` mapped to `ws` and `https` to
    /// `wss`.
    ///
    /// # Errors
    ///
    /// See [`AuthorityConfig::base`].
    pub fn ws_url(&self) -> Result<Url> {
        let base = self.base()?;
        let mut url = join_path(&base, &self.ws_path, false);
        let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|()| ConfigError::InvalidValue {
            field: "base_url",
            reason: format!("cannot derive {scheme} URL"),
        })?;
        Ok(url)
    }
}

fn join_path(base: &Url, path: &str, trailing_slash: bool) -> Url {
    let mut joined = base.path().trim_end_matches('/').to_string();
    let segment = path.trim_matches('/');
    if !segment.is_empty() {
        joined.push('/');
        joined.push_str(segment);
    }
    if trailing_slash || joined.is_empty() {
        joined.push('/');
    }
    let mut url = base.clone();
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);
    url
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            ws_path: default_ws_path(),
        }
    }
}

/// HTTP client settings for the request/response transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Request timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connection timeout (milliseconds).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Attempts per request, including the first.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Base delay between attempts (milliseconds), doubled each retry.
    #[serde(default)]
    pub retry_backoff_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_retry_max_attempts() -> u32 {
    1
}

impl HttpConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: 0,
        }
    }
}
