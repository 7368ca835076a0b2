//! pgseed CLI Library
//!
//! Seeds a Postgres database from the bundled `.gz` line files.
//!
//! # Overview
//!
//! - **Schema**: create the seeded tables (`pgseed init-db`)
//! - **Seeding**: upsert every dataset in dependency order (`pgseed seed`)
//! - **Datasets**: per-file line handlers in [`datasets`]
//! - **IDs**: deterministic record IDs in [`ids`]

pub mod commands;
pub mod config;
pub mod datasets;
pub mod error;
pub mod ids;
pub mod schema;

// Re-export commonly used types
pub use config::Settings;
pub use datasets::Dataset;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pgseed - seed Postgres from line-delimited JSON files
#[derive(Parser, Debug)]
#[command(name = "pgseed")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Directory holding the `<dataset>.gz` files
    #[arg(long, env = "PGSEED_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Lines per batch
    #[arg(long, env = "PGSEED_CHUNK_SIZE", global = true)]
    pub chunk_size: Option<usize>,

    /// Log each finished dataset instead of drawing progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Do not create tables before seeding
    #[arg(long, global = true)]
    pub skip_schema: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create the seeded tables if they do not exist
    InitDb,

    /// Seed every dataset, parents before their dependents
    Seed {
        /// Only seed these datasets (repeatable): users, us-states,
        /// us-counties, esri-landform-polygons
        #[arg(long = "only", value_name = "DATASET")]
        only: Vec<Dataset>,
    },
}

impl Cli {
    /// Progress bars are drawn unless disabled
    pub fn show_progress(&self) -> bool {
        !self.no_progress
    }
}
