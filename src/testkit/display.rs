//! Recording display collaborators.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{OpportunityView, ScanReport, StatusFields, SummaryFields};
use crate::port::{ConnectionIndicator, Displays, Presenter, StatusDisplay, SummaryDisplay};

#[derive(Default)]
struct Log {
    renders: Vec<OpportunityView>,
    summaries: Vec<SummaryFields>,
    statuses: Vec<StatusFields>,
    scans: Vec<ScanReport>,
    indicators: Vec<ConnectionIndicator>,
}

/// Implements every display port and remembers each call. Clones share state.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    log: Arc<Mutex<Log>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this recorder as all three display collaborators.
    pub fn displays(&self) -> Displays {
        Displays::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    pub fn render_count(&self) -> usize {
        self.log.lock().renders.len()
    }

    pub fn last_render(&self) -> Option<OpportunityView> {
        self.log.lock().renders.last().cloned()
    }

    /// Ids of the most recent render, in display order.
    pub fn last_ids(&self) -> Vec<String> {
        self.last_render()
            .map(|view| view.ids().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn summaries(&self) -> Vec<SummaryFields> {
        self.log.lock().summaries.clone()
    }

    pub fn statuses(&self) -> Vec<StatusFields> {
        self.log.lock().statuses.clone()
    }

    pub fn scans(&self) -> Vec<ScanReport> {
        self.log.lock().scans.clone()
    }

    pub fn indicators(&self) -> Vec<ConnectionIndicator> {
        self.log.lock().indicators.clone()
    }
}

impl Presenter for RecordingDisplay {
    fn render(&self, view: &OpportunityView) {
        self.log.lock().renders.push(view.clone());
    }
}

impl SummaryDisplay for RecordingDisplay {
    fn update(&self, summary: &SummaryFields) {
        self.log.lock().summaries.push(summary.clone());
    }
}

impl StatusDisplay for RecordingDisplay {
    fn update_status(&self, status: &StatusFields) {
        self.log.lock().statuses.push(status.clone());
    }

    fn scan_completed(&self, report: &ScanReport) {
        self.log.lock().scans.push(report.clone());
    }

    fn connection_changed(&self, indicator: ConnectionIndicator) {
        self.log.lock().indicators.push(indicator);
    }
}
