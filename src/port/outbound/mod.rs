//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the collaborators the sync core depends on: the
//! push channel, the request transport, and the display surfaces.

pub mod channel;
pub mod display;
pub mod request;
