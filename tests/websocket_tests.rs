//! WebSocket channel against a local server.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arbwatch::adapter::outbound::websocket::WebSocketTransport;
use arbwatch::infrastructure::orchestration::SyncRuntime;
use arbwatch::port::{Channel, ChannelEvent, ChannelTransport, SyncControl};
use arbwatch::testkit::display::RecordingDisplay;
use arbwatch::testkit::domain::{opportunities_body, status_body, summary_body};
use arbwatch::testkit::request::ScriptedAuthority;
use futures_util::{SinkExt, StreamExt};
use rust_decimal_macros::dec;
use support::config::fast_config;
use support::wait::{eventually, settle};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

async fn serve_once(frames: Vec<Message>) -> (Url, tokio::task::JoinHandle<Vec<Message>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(frame).await.unwrap();
        }
        let mut received = Vec::new();
        while let Some(Ok(message)) = ws.next().await {
            received.push(message);
        }
        received
    });

    (Url::parse(&format!("ws://{addr}/ws")).unwrap(), server)
}

#[tokio::test]
async fn delivers_frames_then_close_reason() {
    let (url, server) = serve_once(vec![
        Message::Text(r#"{"type":"status_update","data":{"is_running":true}}"#.into()),
        Message::Binary(b"raw".to_vec()),
        Message::Ping(b"hb".to_vec()),
        Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "scanner shutting down".into(),
        })),
    ])
    .await;

    let mut channel = WebSocketTransport::new().open(&url).unwrap();

    assert_eq!(channel.next_event().await, Some(ChannelEvent::Opened));
    match channel.next_event().await {
        Some(ChannelEvent::Message(bytes)) => {
            assert!(String::from_utf8(bytes).unwrap().contains("status_update"));
        }
        other => panic!("expected text message, got {other:?}"),
    }
    assert_eq!(
        channel.next_event().await,
        Some(ChannelEvent::Message(b"raw".to_vec()))
    );
    assert_eq!(
        channel.next_event().await,
        Some(ChannelEvent::Closed {
            reason: "scanner shutting down".into()
        })
    );
    assert_eq!(channel.next_event().await, None);

    drop(channel);
    let received = server.await.unwrap();
    assert!(received
        .iter()
        .any(|m| matches!(m, Message::Pong(data) if data == b"hb")));
}

#[tokio::test]
async fn dropped_connection_reports_closed_or_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        drop(ws);
    });

    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let mut channel = WebSocketTransport::new().open(&url).unwrap();

    assert_eq!(channel.next_event().await, Some(ChannelEvent::Opened));
    assert!(matches!(
        channel.next_event().await,
        Some(ChannelEvent::Closed { .. } | ChannelEvent::Error { .. })
    ));
    assert_eq!(channel.next_event().await, None);
}

/// Accepts any number of connections, each completing its WebSocket
/// handshake only after `delay`. Returns the bound address and the number
/// of TCP connections accepted so far.
async fn serve_slowly(delay: Duration) -> (std::net::SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Ok(mut ws) = accept_async(stream).await {
                    while let Some(Ok(_)) = ws.next().await {}
                }
            });
        }
    });

    (addr, accepted)
}

#[tokio::test]
async fn interrupted_next_event_resumes_the_same_handshake() {
    let (addr, accepted) = serve_slowly(Duration::from_millis(200)).await;
    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let mut channel = WebSocketTransport::new().open(&url).unwrap();

    for _ in 0..3 {
        let interrupted =
            tokio::time::timeout(Duration::from_millis(20), channel.next_event()).await;
        assert!(interrupted.is_err(), "handshake finished too early");
    }

    assert_eq!(channel.next_event().await, Some(ChannelEvent::Opened));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn commands_during_a_slow_handshake_keep_one_connection() {
    let (addr, accepted) = serve_slowly(Duration::from_millis(300)).await;

    let mut config = fast_config();
    config.authority.base_url = format!("http://{addr}");

    let authority = ScriptedAuthority::new();
    authority
        .always("opportunities", opportunities_body(&[]))
        .always("summary", summary_body(0, dec!(0)))
        .always("status", status_body(true));
    let display = RecordingDisplay::new();

    let (runtime, handle) = SyncRuntime::from_config(
        &config,
        Arc::new(WebSocketTransport::new()),
        Arc::new(authority.clone()),
        display.displays(),
    )
    .unwrap();
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(runtime.run(shutdown_rx));

    // Each refresh pull completes while the handshake is still pending.
    for _ in 0..4 {
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.refresh().await.unwrap();
    }

    let watched = display.clone();
    eventually("connected indicator", move || {
        watched.indicators().iter().any(|i| i.is_connected())
    })
    .await;
    settle().await;

    assert!(authority.calls_to("opportunities") >= 5);
    assert_eq!(accepted.load(Ordering::SeqCst), 1);

    shutdown.send(true).unwrap();
    task.await.unwrap().unwrap();
}
