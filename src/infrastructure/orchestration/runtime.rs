//! Sync loop lifecycle.
//!
//! [`SyncRuntime`] owns the connection manager and the coordinator (and
//! through it the store) on a single task. Commands from [`SyncHandle`]s,
//! channel wakeups and completed requests are handled one at a time inside a
//! `select!` loop, so no handler ever observes another half-done.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::handle::{SyncCommand, SyncHandle};
use crate::application::{
    AuthorityClient, ConnectionManager, ConnectionSignal, FollowUp, SyncCoordinator,
};
use crate::domain::{OpportunityRecord, ScanOutcome, StatusFields, SummaryFields, ViewParams};
use crate::error::{Result, TransportError};
use crate::infrastructure::config::settings::Config;
use crate::port::{ChannelTransport, Displays, RequestTransport};

type Reply<T> = std::result::Result<T, TransportError>;

/// A request that finished while the loop was doing something else.
enum Completion {
    Pull(ViewParams, Reply<Vec<OpportunityRecord>>),
    Summary(Reply<SummaryFields>),
    Status(Reply<StatusFields>),
    Scanner(&'static str, Reply<()>),
    Scan(Reply<ScanOutcome>),
}

/// The single owner of all synchronized state.
pub struct SyncRuntime {
    connection: ConnectionManager,
    coordinator: SyncCoordinator,
    authority: AuthorityClient,
    commands: mpsc::Receiver<SyncCommand>,
    accepting: bool,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl SyncRuntime {
    /// Assemble a runtime from its parts.
    pub fn new(
        connection: ConnectionManager,
        coordinator: SyncCoordinator,
        authority: AuthorityClient,
        command_capacity: usize,
    ) -> (Self, SyncHandle) {
        let (tx, rx) = mpsc::channel(command_capacity.max(1));
        let runtime = Self {
            connection,
            coordinator,
            authority,
            commands: rx,
            accepting: true,
            in_flight: FuturesUnordered::new(),
        };
        (runtime, SyncHandle::new(tx))
    }

    /// Build a runtime from configuration and the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured endpoints or view parameters are
    /// invalid.
    pub fn from_config(
        config: &Config,
        channels: Arc<dyn ChannelTransport>,
        requests: Arc<dyn RequestTransport>,
        displays: Displays,
    ) -> Result<(Self, SyncHandle)> {
        let connection =
            ConnectionManager::new(channels, config.ws_url()?, config.reconnection.policy());
        let coordinator = SyncCoordinator::new(
            displays,
            config.view_params()?,
            config.sync.resync_on_reconnect,
        );
        let authority = AuthorityClient::new(requests, config.sync.limit);
        Ok(Self::new(
            connection,
            coordinator,
            authority,
            config.sync.command_capacity,
        ))
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Starts the push channel and issues the startup pull, summary and
    /// status requests before entering the loop.
    ///
    /// # Errors
    ///
    /// Reserved for fatal failures; transport and decode failures are logged
    /// and never end the loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(url = %self.connection.url(), "Starting sync");

        let signal = self.connection.start();
        self.dispatch(signal);
        let startup = self.coordinator.startup();
        self.issue(startup);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                command = self.commands.recv(), if self.accepting => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            debug!("All sync handles dropped");
                            self.accepting = false;
                        }
                    }
                }
                wakeup = self.connection.next_wakeup() => {
                    let signal = self.connection.apply(wakeup);
                    self.dispatch(signal);
                }
                Some(done) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.complete(done);
                }
            }
        }

        let signal = self.connection.stop();
        self.dispatch(signal);
        let stats = self.coordinator.stats();
        info!(
            applied = stats.messages_applied,
            dropped = stats.messages_dropped,
            pulls = stats.pulls_applied,
            pulls_failed = stats.pulls_failed,
            "Sync stopped"
        );
        Ok(())
    }

    fn handle_command(&mut self, command: SyncCommand) {
        debug!(?command, "Sync command");
        match command {
            SyncCommand::Start => {
                let signal = self.connection.start();
                self.dispatch(signal);
            }
            SyncCommand::Stop => {
                let signal = self.connection.stop();
                self.dispatch(signal);
            }
            SyncCommand::SetFilter(params) => {
                let follow = self.coordinator.set_filter(params);
                self.issue(follow);
            }
            SyncCommand::Refresh => {
                let follow = self.coordinator.refresh();
                self.issue(follow);
            }
            SyncCommand::StartScanner => {
                let authority = self.authority.clone();
                self.spawn(async move {
                    Completion::Scanner("start", authority.start_scanner().await)
                });
            }
            SyncCommand::StopScanner => {
                let authority = self.authority.clone();
                self.spawn(async move {
                    Completion::Scanner("stop", authority.stop_scanner().await)
                });
            }
            SyncCommand::TriggerScan => {
                let authority = self.authority.clone();
                self.spawn(async move { Completion::Scan(authority.trigger_scan().await) });
            }
            SyncCommand::Opportunity { id, reply } => {
                let _ = reply.send(self.coordinator.opportunity(id.as_str()));
            }
            SyncCommand::Stats { reply } => {
                let _ = reply.send(self.coordinator.stats());
            }
        }
    }

    fn complete(&mut self, done: Completion) {
        let follow = match done {
            Completion::Pull(params, result) => self.coordinator.on_pull_completed(params, result),
            Completion::Summary(result) => {
                self.coordinator.on_summary(result);
                Vec::new()
            }
            Completion::Status(result) => {
                self.coordinator.on_status(result);
                Vec::new()
            }
            Completion::Scanner(command, result) => {
                self.coordinator.on_scanner_command(command, result)
            }
            Completion::Scan(result) => self.coordinator.on_scan_triggered(result),
        };
        self.issue(follow);
    }

    fn dispatch(&mut self, signal: Option<ConnectionSignal>) {
        if let Some(signal) = signal {
            let follow = self.coordinator.on_signal(signal);
            self.issue(follow);
        }
    }

    /// Start the requests behind `follow`. Earlier pulls stay in flight;
    /// each applies its own response when it lands.
    fn issue(&mut self, follow: Vec<FollowUp>) {
        for request in follow {
            let authority = self.authority.clone();
            match request {
                FollowUp::Pull(params) => self.spawn(async move {
                    Completion::Pull(params, authority.fetch_opportunities(params).await)
                }),
                FollowUp::RefreshSummary => {
                    self.spawn(async move { Completion::Summary(authority.fetch_summary().await) })
                }
                FollowUp::RefreshStatus => {
                    self.spawn(async move { Completion::Status(authority.fetch_status().await) })
                }
            }
        }
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        self.in_flight.push(request.boxed());
    }
}

impl std::fmt::Debug for SyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRuntime")
            .field("connection", &self.connection)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
