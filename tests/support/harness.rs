//! A running sync loop wired to test doubles.

use std::sync::Arc;

use arbwatch::error::Result;
use arbwatch::infrastructure::config::settings::Config;
use arbwatch::infrastructure::orchestration::{SyncHandle, SyncRuntime};
use arbwatch::port::ChannelEvent;
use arbwatch::testkit::channel::ManualTransport;
use arbwatch::testkit::display::RecordingDisplay;
use arbwatch::testkit::request::ScriptedAuthority;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::wait::eventually;

pub struct Harness {
    pub transport: ManualTransport,
    pub authority: ScriptedAuthority,
    pub display: RecordingDisplay,
    pub handle: SyncHandle,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<()>>,
}

impl Harness {
    /// Spawn the loop with `authority` already scripted and wait for the
    /// first channel to open.
    pub async fn start(config: &Config, authority: ScriptedAuthority) -> Self {
        Self::start_with(config, ManualTransport::new(), authority).await
    }

    pub async fn start_with(
        config: &Config,
        transport: ManualTransport,
        authority: ScriptedAuthority,
    ) -> Self {
        let display = RecordingDisplay::new();
        let (runtime, handle) = SyncRuntime::from_config(
            config,
            Arc::new(transport.clone()),
            Arc::new(authority.clone()),
            display.displays(),
        )
        .expect("runtime from config");

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(runtime.run(shutdown_rx));

        let probe = transport.clone();
        eventually("first channel open", move || probe.opens() >= 1).await;

        Self {
            transport,
            authority,
            display,
            handle,
            shutdown,
            task,
        }
    }

    /// Complete the handshake of the current channel.
    pub async fn connect(&self) {
        assert!(self.transport.emit(ChannelEvent::Opened), "no live channel");
        let display = self.display.clone();
        let connected = display
            .indicators()
            .iter()
            .filter(|i| i.is_connected())
            .count();
        eventually("connected indicator", move || {
            display.indicators().iter().filter(|i| i.is_connected()).count() > connected
        })
        .await;
    }

    pub async fn push(&self, body: Vec<u8>) {
        assert!(
            self.transport.emit(ChannelEvent::Message(body)),
            "no live channel"
        );
    }

    pub async fn pulls_reach(&self, count: usize) {
        let authority = self.authority.clone();
        eventually(&format!("{count} pulls"), move || {
            authority.calls_to("opportunities") >= count
        })
        .await;
    }

    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.task.await.expect("sync task panicked")
    }
}
