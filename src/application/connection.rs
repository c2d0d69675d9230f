//! Push channel lifecycle.
//!
//! [`ConnectionManager`] owns the one live channel and the one pending
//! reconnect deadline. It is a plain state machine: the sync loop awaits
//! [`ConnectionManager::next_wakeup`] and feeds the result back through
//! [`ConnectionManager::handle_event`] or [`ConnectionManager::on_timer_fired`],
//! which return the signal (if any) the coordinator should see.
//!
//! ```text
//!  Disconnected ──start()──▶ Connecting ──Opened──▶ Connected
//!       ▲                        │                      │
//!       └──── Closed / Error ────┴──────────────────────┘
//!             (arms one reconnect deadline)
//! ```

use std::fmt;
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::port::{Channel, ChannelEvent, ChannelTransport};

/// Lifecycle state of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
        }
    }
}

/// What the coordinator hears from the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSignal {
    Connected,
    Disconnected { reason: String },
    Message(Vec<u8>),
}

/// Something the manager was waiting for has happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wakeup {
    Channel(ChannelEvent),
    ReconnectDue,
}

/// Reconnect delay schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect attempt (milliseconds).
    pub initial_delay_ms: u64,
    /// Upper bound on the delay (milliseconds).
    pub max_delay_ms: u64,
    /// Factor applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl ReconnectPolicy {
    /// Delay that follows `current_ms` after one more failure.
    #[must_use]
    pub fn grow(&self, current_ms: u64) -> u64 {
        let next = (current_ms as f64 * self.backoff_multiplier) as u64;
        next.clamp(self.initial_delay_ms, self.max_delay_ms)
    }
}

/// Owns the push channel and its reconnect deadline.
pub struct ConnectionManager {
    /// Opens a fresh channel for each attempt.
    transport: Arc<dyn ChannelTransport>,
    /// Push endpoint.
    url: Url,
    /// Delay schedule between attempts.
    policy: ReconnectPolicy,
    state: ConnectionState,
    /// The live channel, if any. Replaced on every attempt.
    channel: Option<Box<dyn Channel>>,
    /// The single pending reconnect deadline.
    reconnect_at: Option<Instant>,
    /// Delay the next armed deadline will use.
    current_delay_ms: u64,
    /// Failed attempts since the last successful connect.
    consecutive_failures: u32,
}

impl ConnectionManager {
    /// Create a manager in the `Disconnected` state. Nothing is opened until
    /// [`ConnectionManager::start`].
    pub fn new(transport: Arc<dyn ChannelTransport>, url: Url, policy: ReconnectPolicy) -> Self {
        let current_delay_ms = policy.initial_delay_ms;
        Self {
            transport,
            url,
            policy,
            state: ConnectionState::Disconnected,
            channel: None,
            reconnect_at: None,
            current_delay_ms,
            consecutive_failures: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected)
    }

    /// Number of pending reconnect deadlines; never more than one.
    #[must_use]
    pub const fn pending_timers(&self) -> usize {
        if self.reconnect_at.is_some() {
            1
        } else {
            0
        }
    }

    #[must_use]
    pub const fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    #[must_use]
    pub const fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Begin a connection attempt.
    ///
    /// Does nothing unless `Disconnected`. A channel that cannot even be
    /// constructed is reported as an error event for this attempt, so the
    /// usual disconnect path schedules the retry.
    pub fn start(&mut self) -> Option<ConnectionSignal> {
        if self.state != ConnectionState::Disconnected {
            debug!(state = %self.state, "Start ignored, channel already active");
            return None;
        }

        self.reconnect_at = None;
        self.state = ConnectionState::Connecting;
        info!(
            url = %self.url,
            transport = self.transport.transport_name(),
            "Opening push channel"
        );

        match self.transport.open(&self.url) {
            Ok(channel) => {
                self.channel = Some(channel);
                None
            }
            Err(err) => {
                warn!(error = %err, "Push channel construction failed");
                self.handle_event(ChannelEvent::Error {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Close the channel and cancel any pending reconnect.
    ///
    /// Emits `Disconnected` when a channel was active.
    pub fn stop(&mut self) -> Option<ConnectionSignal> {
        self.reconnect_at = None;
        self.channel = None;
        let was = std::mem::replace(&mut self.state, ConnectionState::Disconnected);
        if was == ConnectionState::Disconnected {
            return None;
        }
        info!("Push channel stopped");
        Some(ConnectionSignal::Disconnected {
            reason: "stopped".into(),
        })
    }

    /// Apply one channel event to the state machine.
    pub fn handle_event(&mut self, event: ChannelEvent) -> Option<ConnectionSignal> {
        match event {
            ChannelEvent::Opened => {
                if self.state != ConnectionState::Connecting {
                    debug!(state = %self.state, "Ignoring open event");
                    return None;
                }
                self.state = ConnectionState::Connected;
                self.reconnect_at = None;
                self.reset_backoff();
                info!(url = %self.url, "Push channel connected");
                Some(ConnectionSignal::Connected)
            }
            ChannelEvent::Message(bytes) => {
                if self.state != ConnectionState::Connected {
                    debug!(
                        state = %self.state,
                        bytes = bytes.len(),
                        "Ignoring message outside connected state"
                    );
                    return None;
                }
                Some(ConnectionSignal::Message(bytes))
            }
            ChannelEvent::Closed { reason } | ChannelEvent::Error { reason } => {
                self.channel = None;
                if self.state == ConnectionState::Disconnected {
                    self.schedule_reconnect();
                    return None;
                }
                self.state = ConnectionState::Disconnected;
                self.consecutive_failures += 1;
                warn!(
                    reason = %reason,
                    failures = self.consecutive_failures,
                    "Push channel disconnected"
                );
                self.schedule_reconnect();
                Some(ConnectionSignal::Disconnected { reason })
            }
        }
    }

    /// The reconnect deadline passed.
    ///
    /// Clears the deadline and restarts when still `Disconnected`; otherwise
    /// the firing is stale and only the clear happens.
    pub fn on_timer_fired(&mut self) -> Option<ConnectionSignal> {
        self.reconnect_at = None;
        if self.state != ConnectionState::Disconnected {
            debug!(state = %self.state, "Stale reconnect timer");
            return None;
        }
        debug!("Reconnect timer fired");
        self.start()
    }

    /// Wait for the next channel event or the reconnect deadline.
    ///
    /// Pends forever when there is neither a channel nor a deadline. A
    /// channel that ends without a close event is reported as closed.
    pub async fn next_wakeup(&mut self) -> Wakeup {
        let deadline = self.reconnect_at;
        let channel = self.channel.as_mut();

        tokio::select! {
            event = async {
                match channel {
                    Some(channel) => channel.next_event().await,
                    None => pending().await,
                }
            } => Wakeup::Channel(event.unwrap_or_else(|| ChannelEvent::Closed {
                reason: "channel ended".into(),
            })),
            () = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => pending().await,
                }
            } => Wakeup::ReconnectDue,
        }
    }

    /// Dispatch a wakeup to the matching handler.
    pub fn apply(&mut self, wakeup: Wakeup) -> Option<ConnectionSignal> {
        match wakeup {
            Wakeup::Channel(event) => self.handle_event(event),
            Wakeup::ReconnectDue => self.on_timer_fired(),
        }
    }

    /// Arm the reconnect deadline unless one is already pending.
    fn schedule_reconnect(&mut self) {
        if self.reconnect_at.is_some() {
            debug!("Reconnect already scheduled");
            return;
        }
        let delay = self.next_delay();
        self.reconnect_at = Some(Instant::now() + delay);
        info!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
    }

    fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_millis(self.current_delay_ms);
        self.current_delay_ms = self.policy.grow(self.current_delay_ms);
        delay
    }

    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.policy.initial_delay_ms;
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.url.as_str())
            .field("state", &self.state)
            .field("has_channel", &self.channel.is_some())
            .field("reconnect_at", &self.reconnect_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::channel::ManualTransport;

    fn fast_policy() -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay_ms: 50,
            max_delay_ms: 400,
            backoff_multiplier: 2.0,
        }
    }

    fn manager(transport: &ManualTransport) -> ConnectionManager {
        ConnectionManager::new(
            Arc::new(transport.clone()),
            Url::parse("ws://127.0.0.1:5000/ws").unwrap(),
            fast_policy(),
        )
    }

    fn closed() -> ChannelEvent {
        ChannelEvent::Closed {
            reason: "gone".into(),
        }
    }

    #[test]
    fn starts_disconnected_without_timer() {
        let transport = ManualTransport::new();
        let manager = manager(&transport);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert_eq!(manager.pending_timers(), 0);
        assert_eq!(transport.opens(), 0);
    }

    #[test]
    fn start_then_open_connects() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);

        assert_eq!(manager.start(), None);
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(
            manager.handle_event(ChannelEvent::Opened),
            Some(ConnectionSignal::Connected)
        );
        assert!(manager.is_connected());
        assert_eq!(transport.opens(), 1);
    }

    #[test]
    fn start_is_noop_unless_disconnected() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();
        manager.start();
        manager.handle_event(ChannelEvent::Opened);
        manager.start();

        assert_eq!(transport.opens(), 1);
        assert_eq!(transport.live_channels(), 1);
    }

    #[test]
    fn close_schedules_exactly_one_timer() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();
        manager.handle_event(ChannelEvent::Opened);

        let signal = manager.handle_event(closed());
        assert_eq!(
            signal,
            Some(ConnectionSignal::Disconnected {
                reason: "gone".into()
            })
        );
        assert_eq!(manager.pending_timers(), 1);
        let deadline = manager.reconnect_deadline();

        // A second close before the timer fires.
        assert_eq!(manager.handle_event(closed()), None);
        assert_eq!(
            manager.handle_event(ChannelEvent::Error {
                reason: "again".into()
            }),
            None
        );
        assert_eq!(manager.pending_timers(), 1);
        assert_eq!(manager.reconnect_deadline(), deadline);
        assert!(!manager.has_channel());
    }

    #[test]
    fn error_while_connecting_disconnects() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();

        let signal = manager.handle_event(ChannelEvent::Error {
            reason: "refused".into(),
        });
        assert!(matches!(signal, Some(ConnectionSignal::Disconnected { .. })));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert_eq!(manager.pending_timers(), 1);
    }

    #[test]
    fn messages_ignored_unless_connected() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);

        assert_eq!(manager.handle_event(ChannelEvent::Message(b"x".to_vec())), None);
        manager.start();
        assert_eq!(manager.handle_event(ChannelEvent::Message(b"x".to_vec())), None);
        manager.handle_event(ChannelEvent::Opened);
        assert_eq!(
            manager.handle_event(ChannelEvent::Message(b"x".to_vec())),
            Some(ConnectionSignal::Message(b"x".to_vec()))
        );
        manager.handle_event(closed());
        assert_eq!(manager.handle_event(ChannelEvent::Message(b"x".to_vec())), None);
    }

    #[test]
    fn timer_fire_while_disconnected_restarts() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();
        manager.handle_event(closed());

        assert_eq!(manager.on_timer_fired(), None);
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(manager.pending_timers(), 0);
        assert_eq!(transport.opens(), 2);
        assert_eq!(transport.live_channels(), 1);
    }

    #[test]
    fn stale_timer_fire_is_noop() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();
        manager.handle_event(ChannelEvent::Opened);

        assert_eq!(manager.on_timer_fired(), None);
        assert!(manager.is_connected());
        assert_eq!(transport.opens(), 1);
    }

    #[test]
    fn open_clears_pending_timer() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();
        manager.handle_event(closed());
        manager.on_timer_fired();
        assert_eq!(manager.pending_timers(), 0);

        manager.handle_event(ChannelEvent::Opened);
        assert_eq!(manager.pending_timers(), 0);
        assert!(manager.is_connected());
    }

    #[test]
    fn construction_failure_takes_disconnect_path() {
        let transport = ManualTransport::new();
        transport.fail_next("bad scheme");
        let mut manager = manager(&transport);

        let signal = manager.start();
        assert!(matches!(signal, Some(ConnectionSignal::Disconnected { .. })));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert_eq!(manager.pending_timers(), 1);
        assert!(!manager.has_channel());
    }

    #[test]
    fn stop_cancels_timer_and_channel() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();
        manager.handle_event(ChannelEvent::Opened);

        assert!(matches!(
            manager.stop(),
            Some(ConnectionSignal::Disconnected { .. })
        ));
        assert_eq!(transport.live_channels(), 0);

        manager.start();
        manager.handle_event(closed());
        assert_eq!(manager.pending_timers(), 1);
        assert_eq!(manager.stop(), None);
        assert_eq!(manager.pending_timers(), 0);
    }

    #[test]
    fn backoff_grows_and_resets() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);

        assert_eq!(manager.next_delay(), Duration::from_millis(50));
        assert_eq!(manager.next_delay(), Duration::from_millis(100));
        assert_eq!(manager.next_delay(), Duration::from_millis(200));
        assert_eq!(manager.next_delay(), Duration::from_millis(400));
        assert_eq!(manager.next_delay(), Duration::from_millis(400));

        manager.start();
        manager.handle_event(ChannelEvent::Opened);
        assert_eq!(manager.next_delay(), Duration::from_millis(50));
    }

    #[test]
    fn timer_count_never_exceeds_one() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        let events = [
            ChannelEvent::Opened,
            closed(),
            closed(),
            ChannelEvent::Error { reason: "e".into() },
            ChannelEvent::Opened,
            ChannelEvent::Message(Vec::new()),
            closed(),
        ];

        for round in 0..40 {
            if round % 3 == 0 {
                manager.start();
            }
            if round % 5 == 0 {
                manager.on_timer_fired();
            }
            manager.handle_event(events[round % events.len()].clone());
            assert!(manager.pending_timers() <= 1);
            assert!(transport.live_channels() <= 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wakes_for_channel_events_then_timer() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);
        manager.start();

        transport.emit(ChannelEvent::Opened);
        let wakeup = manager.next_wakeup().await;
        assert_eq!(wakeup, Wakeup::Channel(ChannelEvent::Opened));
        assert_eq!(manager.apply(wakeup), Some(ConnectionSignal::Connected));

        transport.emit(ChannelEvent::Message(b"{}".to_vec()));
        let wakeup = manager.next_wakeup().await;
        assert_eq!(
            manager.apply(wakeup),
            Some(ConnectionSignal::Message(b"{}".to_vec()))
        );

        transport.emit(closed());
        let wakeup = manager.next_wakeup().await;
        assert!(matches!(
            manager.apply(wakeup),
            Some(ConnectionSignal::Disconnected { .. })
        ));

        let started = Instant::now();
        let wakeup = manager.next_wakeup().await;
        assert_eq!(wakeup, Wakeup::ReconnectDue);
        assert!(started.elapsed() >= Duration::from_millis(50));
        manager.apply(wakeup);
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(transport.opens(), 2);
    }

    #[tokio::test]
    async fn idle_manager_never_wakes() {
        let transport = ManualTransport::new();
        let mut manager = manager(&transport);

        let mut wait = tokio_test::task::spawn(manager.next_wakeup());
        tokio_test::assert_pending!(wait.poll());
    }
}
