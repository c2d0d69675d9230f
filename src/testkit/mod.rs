//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`channel`] - [`ManualTransport`](channel::ManualTransport), a push
//!   channel factory whose channels are driven from the test.
//! - [`request`] - [`ScriptedAuthority`](request::ScriptedAuthority), a
//!   request transport with per-path queued responses and a call log.
//! - [`display`] - Recording presenter, summary and status displays.
//! - [`domain`] - Builders for records and wire messages.

pub mod channel;
pub mod display;
pub mod domain;
pub mod request;
