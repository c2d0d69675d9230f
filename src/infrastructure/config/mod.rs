//! Infrastructure configuration modules.

pub mod authority;
pub mod logging;
pub mod reconnection;
pub mod settings;
pub mod sync;
