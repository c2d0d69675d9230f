//! Request/response port.

use std::fmt;

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP-style request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Issues one request against the authority and returns the decoded body.
///
/// Implementations own retries and timeouts; a returned error means the
/// request failed for this cycle.
#[async_trait]
pub trait RequestTransport: Send + Sync {
    /// Send `method path?params` and decode the JSON body.
    ///
    /// `path` is relative to the authority's API root.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, TransportError>;
}
