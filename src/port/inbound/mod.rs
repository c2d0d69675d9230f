//! Inbound (driving) ports consumed by inbound adapters.
//!
//! Inbound ports expose the sync client to its host: the CLI today, an
//! embedding UI tomorrow.

pub mod control;
