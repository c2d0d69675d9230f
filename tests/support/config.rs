use std::io::Write;

use arbwatch::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

/// Defaults with reconnect delays short enough for tests.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.reconnection.initial_delay_ms = 20;
    config.reconnection.max_delay_ms = 80;
    config.reconnection.backoff_multiplier = 2.0;
    config
}

/// Write `contents` to a fresh `.toml` file that lives as long as the handle.
pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("arbwatch-config-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}
