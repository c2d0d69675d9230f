//! Test-driven push channels.
//!
//! [`ManualTransport`] hands out channels backed by an unbounded queue. The
//! test keeps the transport handle and pushes events into the most recently
//! opened channel with [`ManualTransport::emit`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use url::Url;

use crate::error::ChannelError;
use crate::port::{Channel, ChannelEvent, ChannelTransport};

#[derive(Default)]
struct Inner {
    senders: Mutex<Vec<mpsc::UnboundedSender<ChannelEvent>>>,
    failures: Mutex<VecDeque<String>>,
    opened_urls: Mutex<Vec<Url>>,
    opens: AtomicU32,
}

/// Channel factory controlled by the test. Clones share state.
#[derive(Clone, Default)]
pub struct ManualTransport {
    inner: Arc<Inner>,
}

impl ManualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `open` fail construction with `reason`.
    pub fn fail_next(&self, reason: &str) {
        self.inner.failures.lock().push_back(reason.to_string());
    }

    /// Number of `open` calls, including failed ones.
    pub fn opens(&self) -> u32 {
        self.inner.opens.load(Ordering::SeqCst)
    }

    /// Channels whose receiving side is still held by the code under test.
    pub fn live_channels(&self) -> usize {
        self.inner
            .senders
            .lock()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// URLs passed to `open`, in order.
    pub fn opened_urls(&self) -> Vec<Url> {
        self.inner.opened_urls.lock().clone()
    }

    /// Deliver `event` to the most recently opened channel.
    ///
    /// Returns `false` when no channel is open or it has been dropped.
    pub fn emit(&self, event: ChannelEvent) -> bool {
        self.inner
            .senders
            .lock()
            .last()
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    pub fn emit_text(&self, text: &str) -> bool {
        self.emit(ChannelEvent::Message(text.as_bytes().to_vec()))
    }
}

impl ChannelTransport for ManualTransport {
    fn open(&self, url: &Url) -> Result<Box<dyn Channel>, ChannelError> {
        self.inner.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.opened_urls.lock().push(url.clone());

        if let Some(reason) = self.inner.failures.lock().pop_front() {
            return Err(ChannelError::Construction {
                url: url.to_string(),
                reason,
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.senders.lock().push(tx);
        Ok(Box::new(ManualChannel { rx }))
    }

    fn transport_name(&self) -> &'static str {
        "manual"
    }
}

/// Channel half handed to the code under test.
pub struct ManualChannel {
    rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

#[async_trait]
impl Channel for ManualChannel {
    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }
}
