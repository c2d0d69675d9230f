//! Push channel port.
//!
//! A channel is one connection attempt. Construction is synchronous and cheap;
//! the handshake runs inside the channel and is reported as its first event.
//! A channel that has reported `Closed` or `Error` is dead and is dropped.

use async_trait::async_trait;
use url::Url;

use crate::error::ChannelError;

/// Lifecycle and data events from a single channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Handshake completed.
    Opened,
    /// One inbound message body.
    Message(Vec<u8>),
    /// The remote side or the network closed the channel.
    Closed {
        /// The close reason, if any.
        reason: String,
    },
    /// The channel failed.
    Error {
        /// The failure reason.
        reason: String,
    },
}

/// A live push channel.
#[async_trait]
pub trait Channel: Send {
    /// Wait for the next event.
    ///
    /// Returns `None` once the channel has ended; callers treat that as
    /// [`ChannelEvent::Closed`].
    async fn next_event(&mut self) -> Option<ChannelEvent>;
}

/// Factory for push channels.
pub trait ChannelTransport: Send + Sync {
    /// Construct a channel to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Construction`] when the channel cannot even be
    /// created (bad scheme, missing host).
    fn open(&self, url: &Url) -> Result<Box<dyn Channel>, ChannelError>;

    /// Transport name for logging.
    fn transport_name(&self) -> &'static str;
}
