use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate a configuration file without connecting to the scanner.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;
    let params = config.view_params()?;

    println!("✓ Configuration file is valid");
    println!();
    println!("Endpoints:");
    println!("  API: {}", config.api_url()?);
    println!("  Push: {}", config.ws_url()?);
    println!();
    println!("Sync:");
    println!("  Page limit: {}", config.sync.limit);
    println!("  Min profit: {}%", params.min_profit_threshold());
    println!("  Sort: {}", params.sort_key());
    println!("  Resync on reconnect: {}", config.sync.resync_on_reconnect);
    println!(
        "  Reconnect: {}ms initial, x{}, {}ms max",
        config.reconnection.initial_delay_ms,
        config.reconnection.backoff_multiplier,
        config.reconnection.max_delay_ms
    );
    println!();
    println!("Configuration is ready to use.");

    Ok(())
}
