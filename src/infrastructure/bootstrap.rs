//! Composition root: builds the sync runtime from configuration.

use std::sync::Arc;

use tracing::info;

use super::config::settings::Config;
use super::orchestration::{SyncHandle, SyncRuntime};
use crate::adapter::outbound::http::HttpTransport;
use crate::adapter::outbound::websocket::WebSocketTransport;
use crate::error::Result;
use crate::port::Displays;

/// Install the ring crypto provider for rustls.
///
/// Both reqwest and tokio-tungstenite pull in rustls; without an explicit
/// process default the first TLS handshake panics when more than one
/// provider is compiled in. Safe to call more than once.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Build a runtime talking to the configured authority over WebSocket and
/// HTTP, reporting to `displays`.
///
/// # Errors
///
/// Returns an error if the configured endpoints are invalid.
pub fn build_runtime(config: &Config, displays: Displays) -> Result<(SyncRuntime, SyncHandle)> {
    let api_url = config.api_url()?;
    info!(api = %api_url, ws = %config.ws_url()?, "Authority endpoints");

    let requests = Arc::new(HttpTransport::from_config(api_url, &config.http));
    let channels = Arc::new(WebSocketTransport::new());
    SyncRuntime::from_config(config, channels, requests, displays)
}
