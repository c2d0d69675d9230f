//! Handler for the `watch` command.

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::adapter::outbound::display::LogDisplay;
use crate::cli::WatchArgs;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_runtime, install_crypto_provider};
use crate::infrastructure::config::settings::Config;

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
pub async fn execute(args: &WatchArgs) -> Result<()> {
    let mut config =
        Config::load_or_default(&args.config)?.with_view(args.min_profit, args.sort)?;

    if let Some(ref level) = args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    config.init_logging();
    install_crypto_provider();

    let (runtime, _handle) = build_runtime(&config, LogDisplay::new(args.rows).displays())?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(config = %args.config.display(), "arbwatch starting");
    let mut sync = tokio::spawn(runtime.run(shutdown_rx));

    tokio::select! {
        result = &mut sync => {
            report(result);
            return Ok(());
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    report(sync.await);
    info!("arbwatch stopped");
    Ok(())
}

fn report(result: std::result::Result<Result<()>, JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Sync failed"),
        Err(e) => error!(error = %e, "Sync task aborted"),
    }
}
