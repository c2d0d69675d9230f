//! Log-backed display collaborators.
//!
//! The CLI has no screen to draw on, so every display update becomes a
//! structured tracing event.

use std::sync::Arc;

use tracing::info;

use crate::domain::{OpportunityView, ScanReport, StatusFields, SummaryFields};
use crate::port::{ConnectionIndicator, Displays, Presenter, StatusDisplay, SummaryDisplay};

/// Logs every display update. `rows` caps how many records a render lists.
#[derive(Debug, Clone, Copy)]
pub struct LogDisplay {
    rows: usize,
}

impl LogDisplay {
    #[must_use]
    pub const fn new(rows: usize) -> Self {
        Self { rows }
    }

    /// This display as all three collaborators.
    #[must_use]
    pub fn displays(self) -> Displays {
        let shared = Arc::new(self);
        Displays::new(shared.clone(), shared.clone(), shared)
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Presenter for LogDisplay {
    fn render(&self, view: &OpportunityView) {
        let params = view.params();
        info!(
            shown = view.len(),
            min_profit = %params.min_profit_threshold(),
            sort = %params.sort_key(),
            "Opportunities"
        );
        for (rank, record) in view.iter().take(self.rows).enumerate() {
            info!(
                rank = rank + 1,
                id = %record.id,
                kind = record.arbitrage_type.label(),
                net_profit_percent = %record.net_profit_percent,
                net_profit = %record.net_profit,
                liquidity = %record.liquidity_or_zero(),
                question = %record.market_question,
                "  opportunity"
            );
        }
    }
}

impl SummaryDisplay for LogDisplay {
    fn update(&self, summary: &SummaryFields) {
        info!(
            active = summary.active_opportunities,
            total_profit_potential = %summary.total_profit_potential,
            best_percent = %summary.best_opportunity_percent,
            markets_scanned = summary.markets_scanned,
            "Summary"
        );
    }
}

impl StatusDisplay for LogDisplay {
    fn update_status(&self, status: &StatusFields) {
        info!(
            running = status.is_running,
            last_scan_at = ?status.last_scan_at,
            scans = ?status.scan_count,
            markets = ?status.markets_scanned,
            "Scanner status"
        );
    }

    fn scan_completed(&self, report: &ScanReport) {
        info!(
            markets = report.markets,
            opportunities = ?report.opportunities,
            "Scan completed"
        );
    }

    fn connection_changed(&self, indicator: ConnectionIndicator) {
        info!(status = %indicator, "Push channel");
    }
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl NullDisplay {
    #[must_use]
    pub fn displays() -> Displays {
        let shared = Arc::new(Self);
        Displays::new(shared.clone(), shared.clone(), shared)
    }
}

impl Presenter for NullDisplay {
    fn render(&self, _view: &OpportunityView) {}
}

impl SummaryDisplay for NullDisplay {
    fn update(&self, _summary: &SummaryFields) {}
}

impl StatusDisplay for NullDisplay {
    fn update_status(&self, _status: &StatusFields) {}
    fn scan_completed(&self, _report: &ScanReport) {}
    fn connection_changed(&self, _indicator: ConnectionIndicator) {}
}
