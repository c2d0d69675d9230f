//! Sync orchestration.
//!
//! Runtime wiring and lifecycle management for the single sync loop.

pub mod handle;
pub mod runtime;

pub use handle::{SyncCommand, SyncHandle};
pub use runtime::SyncRuntime;
