//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points of the sync client. They are traits
//! that adapters implement to integrate with external systems.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!     host ─────────▶│  SyncControl (inbound)  │
//!                    │                         │
//!                    │  store / connection /   │
//!                    │  coordinator            │
//!                    └─────────────────────────┘
//!                      │          │           │
//!                      ▼          ▼           ▼
//!                ┌─────────┐ ┌─────────┐ ┌──────────┐
//!                │ Channel │ │ Request │ │ Displays │
//!                └─────────┘ └─────────┘ └──────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`ChannelTransport`], [`Channel`] - Push channel
//! - [`RequestTransport`] - Pull requests against the authority
//! - [`Presenter`], [`SummaryDisplay`], [`StatusDisplay`] - Display surfaces
//! - [`SyncControl`] - Host control surface

pub mod inbound;
pub mod outbound;

pub use inbound::control::{SyncControl, SyncStats};
pub use outbound::channel::{Channel, ChannelEvent, ChannelTransport};
pub use outbound::display::{ConnectionIndicator, Displays, Presenter, StatusDisplay, SummaryDisplay};
pub use outbound::request::{Method, RequestTransport};
