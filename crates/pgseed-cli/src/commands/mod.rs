//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod init_db;
pub mod seed;

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::error::Result;
use crate::{Cli, Commands};

/// Execute the parsed command; `cancel` interrupts a running seed
pub async fn execute(cli: &Cli, cancel: CancellationToken) -> Result<()> {
    let settings = Settings::from_env()?.with_cli(cli)?;

    match &cli.command {
        Commands::InitDb => init_db::run(&settings).await,
        Commands::Seed { only } => {
            let options = seed::SeedOptions {
                only: only.clone(),
                skip_schema: cli.skip_schema,
                progress: cli.show_progress(),
            };
            seed::run(&settings, &options, cancel).await.map(|_| ())
        }
    }
}
