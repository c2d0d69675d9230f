//! Sync loop configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{DomainError, SortKey, ViewParams};

/// Largest page the authority serves.
pub const MAX_LIMIT: u32 = 500;

/// Pull parameters and loop tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyncConfig {
    /// Page size for pull requests (1..=500).
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Initial filter floor, in percent.
    #[serde(default)]
    pub min_profit_threshold: Decimal,
    /// Initial sort key name.
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Pull after the channel comes back from a disconnect.
    #[serde(default = "default_resync_on_reconnect")]
    pub resync_on_reconnect: bool,
    /// Bounded capacity of the control command queue.
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,
}

const fn default_limit() -> u32 {
    100
}

fn default_sort() -> String {
    "profit".into()
}

const fn default_resync_on_reconnect() -> bool {
    true
}

const fn default_command_capacity() -> usize {
    64
}

impl SyncConfig {
    /// Initial view parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] for an unknown sort name or a negative
    /// threshold.
    pub fn view_params(&self) -> Result<ViewParams, DomainError> {
        let sort_key: SortKey = self.sort.parse()?;
        ViewParams::try_new(self.min_profit_threshold, sort_key)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_profit_threshold: Decimal::ZERO,
            sort: default_sort(),
            resync_on_reconnect: default_resync_on_reconnect(),
            command_capacity: default_command_capacity(),
        }
    }
}
