//! Outbound adapters (driven side).

pub mod display;
pub mod http;
pub mod websocket;
