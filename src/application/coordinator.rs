//! Sync coordinator.
//!
//! Applies push messages and pull results to the [`OpportunityStore`] and
//! notifies the display collaborators. It never performs I/O itself: every
//! handler returns the [`FollowUp`] requests the sync loop should issue.
//!
//! Every handler runs to completion. A store mutation is finished before the
//! presenter or any display hears about it.

use tracing::{debug, info, warn};

use super::connection::ConnectionSignal;
use super::message::InboundMessage;
use super::store::OpportunityStore;
use crate::domain::{OpportunityRecord, ScanOutcome, StatusFields, SummaryFields, ViewParams};
use crate::error::TransportError;
use crate::port::{ConnectionIndicator, Displays, SyncStats};

/// Request the sync loop should issue on the coordinator's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Authoritative pull with these view parameters.
    Pull(ViewParams),
    RefreshSummary,
    RefreshStatus,
}

/// Turns sync events into store operations and display updates.
#[derive(Debug)]
pub struct SyncCoordinator {
    /// Local mirror of the authority's opportunity set.
    store: OpportunityStore,
    /// Current filter and sort, used for views and pulls.
    params: ViewParams,
    /// Presenter, summary and status collaborators.
    displays: Displays,
    /// Pull again when the channel comes back after a drop.
    resync_on_reconnect: bool,
    /// A disconnect was seen since the last connect, so the next one is a reconnect.
    seen_disconnect: bool,
    /// Counters reported through `SyncControl::stats`.
    stats: SyncStats,
}

impl SyncCoordinator {
    pub fn new(displays: Displays, params: ViewParams, resync_on_reconnect: bool) -> Self {
        Self {
            store: OpportunityStore::new(),
            params,
            displays,
            resync_on_reconnect,
            seen_disconnect: false,
            stats: SyncStats::default(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &OpportunityStore {
        &self.store
    }

    #[must_use]
    pub const fn params(&self) -> ViewParams {
        self.params
    }

    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats.clone()
    }

    /// Initial pull plus summary and status.
    #[must_use]
    pub fn startup(&self) -> Vec<FollowUp> {
        vec![
            FollowUp::Pull(self.params),
            FollowUp::RefreshSummary,
            FollowUp::RefreshStatus,
        ]
    }

    /// React to a connection manager signal.
    pub fn on_signal(&mut self, signal: ConnectionSignal) -> Vec<FollowUp> {
        match signal {
            ConnectionSignal::Connected => {
                self.stats.connections += 1;
                self.displays
                    .status
                    .connection_changed(ConnectionIndicator::Connected);
                let resync = std::mem::take(&mut self.seen_disconnect);
                if resync && self.resync_on_reconnect {
                    info!("Reconnected, resynchronizing");
                    return vec![FollowUp::Pull(self.params)];
                }
                Vec::new()
            }
            ConnectionSignal::Disconnected { reason } => {
                debug!(reason = %reason, "Connection indicator off");
                self.seen_disconnect = true;
                self.displays
                    .status
                    .connection_changed(ConnectionIndicator::Disconnected);
                Vec::new()
            }
            ConnectionSignal::Message(bytes) => self.on_message(&bytes),
        }
    }

    /// Decode and apply one raw push message. Undecodable messages are
    /// dropped and counted.
    pub fn on_message(&mut self, bytes: &[u8]) -> Vec<FollowUp> {
        match InboundMessage::decode(bytes) {
            Ok(message) => self.apply(message),
            Err(err) => {
                self.stats.messages_dropped += 1;
                warn!(
                    error = %err,
                    bytes = bytes.len(),
                    dropped = self.stats.messages_dropped,
                    "Dropping undecodable push message"
                );
                Vec::new()
            }
        }
    }

    /// Apply one decoded push message.
    pub fn apply(&mut self, message: InboundMessage) -> Vec<FollowUp> {
        match message {
            InboundMessage::NewOpportunity(record) => {
                self.stats.messages_applied += 1;
                debug!(id = %record.id, percent = %record.net_profit_percent, "Opportunity pushed");
                self.store.upsert(record);
                self.render();
                vec![FollowUp::RefreshSummary]
            }
            InboundMessage::OpportunityExpired(id) => {
                self.stats.messages_applied += 1;
                if self.store.remove(id.as_str()).is_none() {
                    debug!(id = %id, "Expired opportunity was not stored");
                }
                self.render();
                vec![FollowUp::RefreshSummary]
            }
            InboundMessage::StatusUpdate(status) => {
                self.stats.messages_applied += 1;
                self.displays.status.update_status(&status);
                Vec::new()
            }
            InboundMessage::ScanComplete(report) => {
                self.stats.messages_applied += 1;
                info!(
                    markets = report.markets,
                    opportunities = ?report.opportunities,
                    "Scan complete"
                );
                self.displays.status.scan_completed(&report);
                vec![FollowUp::Pull(self.params)]
            }
            InboundMessage::Unrecognized { kind, .. } => {
                self.stats.messages_unrecognized += 1;
                debug!(kind = %kind, "Ignoring unrecognized push message");
                Vec::new()
            }
        }
    }

    /// A pull finished. Success replaces the store with the response's own
    /// records, whatever happened since it was issued.
    pub fn on_pull_completed(
        &mut self,
        params: ViewParams,
        result: Result<Vec<OpportunityRecord>, TransportError>,
    ) -> Vec<FollowUp> {
        match result {
            Ok(records) => {
                let summary = self.store.replace_all(records);
                self.stats.pulls_applied += 1;
                debug!(
                    inserted = summary.inserted,
                    replaced = summary.replaced,
                    removed = summary.removed,
                    sort = %params.sort_key(),
                    "Applied pull"
                );
                self.render();
                vec![FollowUp::RefreshSummary]
            }
            Err(err) => {
                self.stats.pulls_failed += 1;
                warn!(error = %err, "Pull failed, will retry on next trigger");
                Vec::new()
            }
        }
    }

    pub fn on_summary(&self, result: Result<SummaryFields, TransportError>) {
        match result {
            Ok(summary) => self.displays.summary.update(&summary),
            Err(err) => warn!(error = %err, "Summary refresh failed"),
        }
    }

    pub fn on_status(&self, result: Result<StatusFields, TransportError>) {
        match result {
            Ok(status) => self.displays.status.update_status(&status),
            Err(err) => warn!(error = %err, "Status refresh failed"),
        }
    }

    /// Adopt new view parameters, redraw from the local store and pull with
    /// them. The redraw stands even if the pull fails.
    pub fn set_filter(&mut self, params: ViewParams) -> Vec<FollowUp> {
        info!(
            min_profit = %params.min_profit_threshold(),
            sort = %params.sort_key(),
            "View parameters changed"
        );
        self.params = params;
        self.render();
        vec![FollowUp::Pull(params)]
    }

    #[must_use]
    pub fn refresh(&self) -> Vec<FollowUp> {
        vec![FollowUp::Pull(self.params)]
    }

    /// A scanner start or stop request finished.
    #[must_use]
    pub fn on_scanner_command(
        &self,
        command: &str,
        result: Result<(), TransportError>,
    ) -> Vec<FollowUp> {
        match result {
            Ok(()) => info!(command, "Scanner command accepted"),
            Err(err) => warn!(command, error = %err, "Scanner command failed"),
        }
        vec![FollowUp::RefreshStatus]
    }

    /// A manually triggered scan finished.
    #[must_use]
    pub fn on_scan_triggered(
        &self,
        result: Result<ScanOutcome, TransportError>,
    ) -> Vec<FollowUp> {
        match result {
            Ok(outcome) => info!(
                message = %outcome.message,
                found = ?outcome.opportunities_found,
                markets = ?outcome.markets_scanned,
                "Manual scan finished"
            ),
            Err(err) => warn!(error = %err, "Manual scan failed"),
        }
        vec![
            FollowUp::Pull(self.params),
            FollowUp::RefreshSummary,
            FollowUp::RefreshStatus,
        ]
    }

    #[must_use]
    pub fn opportunity(&self, id: &str) -> Option<OpportunityRecord> {
        self.store.get(id).cloned()
    }

    fn render(&mut self) {
        let view = self.store.view(self.params);
        self.displays.presenter.render(&view);
    }
}
