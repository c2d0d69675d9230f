//! WebSocket push channel.
//!
//! Construction only validates the URL; the handshake is driven by
//! [`Channel::next_event`] and reported as `Opened` or `Error`. The handshake
//! future lives in the channel, so a `next_event` call that is dropped before
//! it completes leaves the same attempt to be resumed by the next call.
//!
//! # Message Loop
//!
//! - **Text / Binary frames**: delivered as [`ChannelEvent::Message`]
//! - **Ping frames**: tungstenite queues the Pong reply, flushed on the next read
//! - **Close frames**: reported as [`ChannelEvent::Closed`] with the close reason
//! - **Errors**: reported as [`ChannelEvent::Error`]; the channel is dead after

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::client::Response;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::ChannelError;
use crate::port::{Channel, ChannelEvent, ChannelTransport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Handshake = BoxFuture<'static, Result<(WsStream, Response), WsError>>;

/// Opens [`WebSocketChannel`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ChannelTransport for WebSocketTransport {
    fn open(&self, url: &Url) -> Result<Box<dyn Channel>, ChannelError> {
        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(ChannelError::Construction {
                    url: url.to_string(),
                    reason: format!("unsupported scheme '{other}', expected ws or wss"),
                })
            }
        }
        if url.host_str().is_none() {
            return Err(ChannelError::Construction {
                url: url.to_string(),
                reason: "missing host".into(),
            });
        }
        Ok(Box::new(WebSocketChannel::new(url.clone())))
    }

    fn transport_name(&self) -> &'static str {
        "websocket"
    }
}

enum Phase {
    /// Pending handshake, polled across `next_event` calls.
    Handshake(Handshake),
    Open(Box<WsStream>),
    Ended,
}

/// One WebSocket connection attempt.
pub struct WebSocketChannel {
    url: Url,
    phase: Phase,
}

impl WebSocketChannel {
    /// Creates the channel. Nothing touches the network until the first poll.
    #[must_use]
    pub fn new(url: Url) -> Self {
        let target = url.to_string();
        Self {
            url,
            phase: Phase::Handshake(connect_async(target).boxed()),
        }
    }

    fn finish_handshake(&mut self, result: Result<(WsStream, Response), WsError>) -> ChannelEvent {
        match result {
            Ok((ws, response)) => {
                info!(url = %self.url, status = %response.status(), "WebSocket connected");
                self.phase = Phase::Open(Box::new(ws));
                ChannelEvent::Opened
            }
            Err(err) => {
                debug!(url = %self.url, error = %err, "WebSocket handshake failed");
                self.phase = Phase::Ended;
                ChannelEvent::Error {
                    reason: ChannelError::Handshake(err.to_string()).to_string(),
                }
            }
        }
    }

    fn end(&mut self, event: ChannelEvent) -> Option<ChannelEvent> {
        self.phase = Phase::Ended;
        Some(event)
    }
}

#[async_trait]
impl Channel for WebSocketChannel {
    async fn next_event(&mut self) -> Option<ChannelEvent> {
        let ws = match &mut self.phase {
            Phase::Handshake(handshake) => {
                let result = handshake.await;
                return Some(self.finish_handshake(result));
            }
            Phase::Ended => return None,
            Phase::Open(ws) => ws,
        };

        // Only `StreamExt::next` is awaited below, so dropping this call
        // between frames loses nothing.
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    return Some(ChannelEvent::Message(text.into_bytes()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    trace!(bytes = bytes.len(), "Received WebSocket binary frame");
                    return Some(ChannelEvent::Message(bytes));
                }
                Some(Ok(Message::Ping(_))) => {
                    trace!("Received WebSocket ping, pong queued");
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "closed by server".into());
                    return self.end(ChannelEvent::Closed { reason });
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(error = %err, "WebSocket error");
                    return self.end(ChannelEvent::Error {
                        reason: err.to_string(),
                    });
                }
                None => {
                    return self.end(ChannelEvent::Closed {
                        reason: "stream ended".into(),
                    });
                }
            }
        }
    }
}
