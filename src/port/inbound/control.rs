//! Control port exposed to the host.
//!
//! Every call is a message into the single sync loop; the loop processes
//! them one at a time between I/O completions.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{OpportunityId, OpportunityRecord, SortKey};
use crate::error::Result;

/// Counters kept by the sync loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Push messages applied to the store or forwarded to a display.
    pub messages_applied: u64,
    /// Push messages dropped because they could not be decoded.
    pub messages_dropped: u64,
    /// Push messages with a kind this client does not know.
    pub messages_unrecognized: u64,
    /// Pull refreshes applied via authoritative replace.
    pub pulls_applied: u64,
    /// Pull refreshes that failed in transport or decoding.
    pub pulls_failed: u64,
    /// Times the channel reached the connected state.
    pub connections: u64,
}

/// Host-facing control surface of the sync client.
#[async_trait]
pub trait SyncControl: Send + Sync {
    /// Start the push channel.
    async fn start(&self) -> Result<()>;

    /// Stop the push channel and cancel any pending reconnect.
    async fn stop(&self) -> Result<()>;

    /// Change the view parameters and pull with them.
    ///
    /// # Errors
    ///
    /// Rejects a negative threshold without contacting the loop.
    async fn set_filter(&self, min_profit_threshold: Decimal, sort_key: SortKey) -> Result<()>;

    /// Pull with the current view parameters.
    async fn refresh(&self) -> Result<()>;

    /// Ask the authority to start continuous scanning.
    async fn start_scanner(&self) -> Result<()>;

    /// Ask the authority to stop continuous scanning.
    async fn stop_scanner(&self) -> Result<()>;

    /// Ask the authority for one scan, then refresh everything.
    async fn trigger_scan(&self) -> Result<()>;

    /// Look up a locally stored record.
    async fn opportunity(&self, id: &OpportunityId) -> Result<Option<OpportunityRecord>>;

    /// Snapshot of the loop's counters.
    async fn stats(&self) -> Result<SyncStats>;
}
