//! pgseed CLI - Main entry point

use clap::Parser;
use pgseed_cli::Cli;
use pgseed_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() {
    // .env must be loaded before clap reads env-backed flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Bars and info lines share stderr; keep it quiet while bars are drawn
    let level = if cli.verbose {
        LogLevel::Debug
    } else if cli.show_progress() {
        LogLevel::Warn
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("pgseed")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: failed to initialise logging: {:#}", e);
            None
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping seed run");
                cancel.cancel();
            }
        }
    });

    if let Err(e) = pgseed_cli::commands::execute(&cli, cancel).await {
        if e.is_cancelled() {
            eprintln!("Interrupted.");
        } else {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}
