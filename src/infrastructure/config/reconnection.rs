//! Push channel reconnection configuration.

use serde::Deserialize;

use crate::application::ReconnectPolicy;

/// Delay schedule for reconnect attempts.
///
/// The default is a fixed 5 second delay: `backoff_multiplier = 1.0` keeps
/// every delay at `initial_delay_ms`. Larger multipliers grow the delay after
/// each failed attempt up to `max_delay_ms`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReconnectionConfig {
    /// Delay before the first reconnect attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound on the delay (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

const fn default_initial_delay_ms() -> u64 {
    5_000
}

const fn default_max_delay_ms() -> u64 {
    60_000
}

const fn default_backoff_multiplier() -> f64 {
    1.0
}

impl ReconnectionConfig {
    /// The schedule handed to the connection manager.
    #[must_use]
    pub const fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay_ms: self.initial_delay_ms,
            max_delay_ms: self.max_delay_ms,
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}
