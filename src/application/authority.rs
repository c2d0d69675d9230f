//! Typed calls against the authority's request/response API.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::{OpportunityRecord, ScanOutcome, StatusFields, SummaryFields, ViewParams};
use crate::error::TransportError;
use crate::port::{Method, RequestTransport};

pub const OPPORTUNITIES_PATH: &str = "opportunities";
pub const SUMMARY_PATH: &str = "summary";
pub const STATUS_PATH: &str = "status";
pub const START_PATH: &str = "start";
pub const STOP_PATH: &str = "stop";
pub const SCAN_PATH: &str = "scan";

/// Authority API client over any [`RequestTransport`].
///
/// Cheap to clone; in-flight requests each hold their own clone.
#[derive(Clone)]
pub struct AuthorityClient {
    transport: Arc<dyn RequestTransport>,
    limit: u32,
}

impl AuthorityClient {
    /// `limit` is the page size sent with every pull.
    pub fn new(transport: Arc<dyn RequestTransport>, limit: u32) -> Self {
        Self { transport, limit }
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Pull the opportunity list for `params`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request fails or the body is not
    /// a list of records.
    pub async fn fetch_opportunities(
        &self,
        params: ViewParams,
    ) -> Result<Vec<OpportunityRecord>, TransportError> {
        let query = [
            ("min_profit", params.min_profit_threshold().to_string()),
            ("sort", params.sort_key().as_query().to_string()),
            ("limit", self.limit.to_string()),
        ];
        let records: Vec<OpportunityRecord> = self
            .call(Method::Get, OPPORTUNITIES_PATH, &query)
            .await?;
        debug!(count = records.len(), "Fetched opportunities");
        Ok(records)
    }

    /// # Errors
    ///
    /// Returns a [`TransportError`] on request or decode failure.
    pub async fn fetch_summary(&self) -> Result<SummaryFields, TransportError> {
        self.call(Method::Get, SUMMARY_PATH, &[]).await
    }

    /// # Errors
    ///
    /// Returns a [`TransportError`] on request or decode failure.
    pub async fn fetch_status(&self) -> Result<StatusFields, TransportError> {
        self.call(Method::Get, STATUS_PATH, &[]).await
    }

    /// Ask the authority to start its scanner.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on request failure.
    pub async fn start_scanner(&self) -> Result<(), TransportError> {
        self.call::<Value>(Method::Post, START_PATH, &[]).await?;
        Ok(())
    }

    /// Ask the authority to stop its scanner.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on request failure.
    pub async fn stop_scanner(&self) -> Result<(), TransportError> {
        self.call::<Value>(Method::Post, STOP_PATH, &[]).await?;
        Ok(())
    }

    /// Run one scan on the authority.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on request or decode failure.
    pub async fn trigger_scan(&self) -> Result<ScanOutcome, TransportError> {
        self.call(Method::Post, SCAN_PATH, &[]).await
    }

    async fn call<T>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        let body = self.transport.request(method, path, params).await?;
        serde_json::from_value(body).map_err(|err| TransportError::MalformedResponse {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }
}

impl fmt::Debug for AuthorityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorityClient")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
