//! Aggregate and scanner-status payloads.
//!
//! Neither is derived from the local store: the authority owns the counting
//! rules, so the client re-fetches these after every mutation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wire;

/// Aggregate counters shown alongside the opportunity list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFields {
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub active_opportunities: u64,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub total_profit_potential: Decimal,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub best_opportunity_percent: Decimal,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub markets_scanned: u64,
}

/// Scanner status as reported by the authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFields {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub last_scan_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scan_count: Option<u64>,
    #[serde(default)]
    pub markets_scanned: Option<u64>,
    #[serde(default)]
    pub active_opportunities_count: Option<u64>,
}

/// Metadata carried by a `scan_complete` push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub markets: u64,
    #[serde(default)]
    pub opportunities: Option<u64>,
}

/// Response to a manually triggered scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScanOutcome {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub opportunities_found: Option<u64>,
    #[serde(default)]
    pub markets_scanned: Option<u64>,
}
