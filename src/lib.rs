//! Arbwatch - real-time state sync for an arbitrage scanner dashboard.
//!
//! The scanner (the *authority*) owns the opportunity set. This crate keeps a
//! local replica consistent with it by combining incremental pushes over a
//! WebSocket with full-snapshot pulls over REST.
//!
//! # Architecture
//!
//! - [`domain`] - Opportunity records, view parameters, summary and status fields
//! - [`port`] - Traits at the seams: push channel, request transport, displays
//! - [`application`] - Opportunity store, connection manager, sync coordinator
//! - [`adapter`] - WebSocket, HTTP and log-backed display implementations
//! - [`infrastructure`] - Configuration, bootstrap and the sync runtime loop
//! - [`cli`] - Command-line entry points
//!
//! # Example
//!
//! ```no_run
//! use arbwatch::adapter::outbound::display::LogDisplay;
//! use arbwatch::infrastructure::bootstrap::build_runtime;
//! use arbwatch::infrastructure::config::settings::Config;
//!
//! # async fn run() -> arbwatch::error::Result<()> {
//! let config = Config::default();
//! let (runtime, _handle) = build_runtime(&config, LogDisplay::default().displays())?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! runtime.run(shutdown_rx).await
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
