//! Message-passing handle into the sync loop.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{OpportunityId, OpportunityRecord, SortKey, ViewParams};
use crate::error::{Error, Result};
use crate::port::{SyncControl, SyncStats};

/// One request into the sync loop.
#[derive(Debug)]
pub enum SyncCommand {
    Start,
    Stop,
    SetFilter(ViewParams),
    Refresh,
    StartScanner,
    StopScanner,
    TriggerScan,
    Opportunity {
        id: OpportunityId,
        reply: oneshot::Sender<Option<OpportunityRecord>>,
    },
    Stats {
        reply: oneshot::Sender<SyncStats>,
    },
}

/// Clonable control handle. Every call is queued to the single loop that
/// owns the store and the connection.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    commands: mpsc::Sender<SyncCommand>,
}

impl SyncHandle {
    pub(crate) fn new(commands: mpsc::Sender<SyncCommand>) -> Self {
        Self { commands }
    }

    async fn send(&self, command: SyncCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::RuntimeStopped)
    }

    async fn ask<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> SyncCommand) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        response.await.map_err(|_| Error::RuntimeStopped)
    }
}

#[async_trait]
impl SyncControl for SyncHandle {
    async fn start(&self) -> Result<()> {
        self.send(SyncCommand::Start).await
    }

    async fn stop(&self) -> Result<()> {
        self.send(SyncCommand::Stop).await
    }

    async fn set_filter(&self, min_profit_threshold: Decimal, sort_key: SortKey) -> Result<()> {
        let params = ViewParams::try_new(min_profit_threshold, sort_key)?;
        self.send(SyncCommand::SetFilter(params)).await
    }

    async fn refresh(&self) -> Result<()> {
        self.send(SyncCommand::Refresh).await
    }

    async fn start_scanner(&self) -> Result<()> {
        self.send(SyncCommand::StartScanner).await
    }

    async fn stop_scanner(&self) -> Result<()> {
        self.send(SyncCommand::StopScanner).await
    }

    async fn trigger_scan(&self) -> Result<()> {
        self.send(SyncCommand::TriggerScan).await
    }

    async fn opportunity(&self, id: &OpportunityId) -> Result<Option<OpportunityRecord>> {
        let id = id.clone();
        self.ask(|reply| SyncCommand::Opportunity { id, reply }).await
    }

    async fn stats(&self) -> Result<SyncStats> {
        self.ask(|reply| SyncCommand::Stats { reply }).await
    }
}
