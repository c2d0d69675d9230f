//! Diagnostic check commands.

mod config;

pub use config::execute_config;
