//! Display ports: where synchronized state goes after every change.
//!
//! Rendering itself is out of scope for the client core. These traits are
//! the narrow surfaces a host implements (terminal UI, web page bridge, logs).
//!
//! # Implementation Notes
//!
//! - Implementations must be thread-safe (`Send + Sync`)
//! - Calls are made from the single sync loop and must return quickly
//! - Repeated calls with overlapping data are normal; redraws must be idempotent

use std::fmt;
use std::sync::Arc;

use crate::domain::{OpportunityView, ScanReport, StatusFields, SummaryFields};

/// Binary connection indicator shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionIndicator {
    Connected,
    Disconnected,
}

impl ConnectionIndicator {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("Connected"),
            Self::Disconnected => f.write_str("Disconnected"),
        }
    }
}

/// Draws the ordered opportunity list.
pub trait Presenter: Send + Sync {
    /// Replace whatever is on screen with `view`.
    fn render(&self, view: &OpportunityView);
}

/// Shows the aggregate counters.
pub trait SummaryDisplay: Send + Sync {
    fn update(&self, summary: &SummaryFields);
}

/// Shows scanner status and the connection indicator.
pub trait StatusDisplay: Send + Sync {
    /// Full status snapshot from the authority.
    fn update_status(&self, status: &StatusFields);

    /// A scan finished; `report` carries the scan metadata.
    fn scan_completed(&self, report: &ScanReport);

    /// The push channel connected or disconnected.
    fn connection_changed(&self, indicator: ConnectionIndicator);
}

/// The three display collaborators, shared with the sync loop.
#[derive(Clone)]
pub struct Displays {
    pub presenter: Arc<dyn Presenter>,
    pub summary: Arc<dyn SummaryDisplay>,
    pub status: Arc<dyn StatusDisplay>,
}

impl Displays {
    #[must_use]
    pub fn new(
        presenter: Arc<dyn Presenter>,
        summary: Arc<dyn SummaryDisplay>,
        status: Arc<dyn StatusDisplay>,
    ) -> Self {
        Self {
            presenter,
            summary,
            status,
        }
    }
}

impl fmt::Debug for Displays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Displays").finish_non_exhaustive()
    }
}
