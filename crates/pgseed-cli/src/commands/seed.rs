//! `pgseed seed` command implementation

use pgseed::db::{create_pool, health_check};
use pgseed::{Seeder, TerminalProgress};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Settings;
use crate::datasets::{self, Dataset};
use crate::error::Result;
use crate::schema;

#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    /// Datasets to seed; empty means all
    pub only: Vec<Dataset>,
    pub skip_schema: bool,
    pub progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub tasks: usize,
    pub elapsed: Duration,
}

/// Bootstrap the schema (unless skipped) and seed the selected datasets
pub async fn run(
    settings: &Settings,
    options: &SeedOptions,
    cancel: CancellationToken,
) -> Result<SeedSummary> {
    let forest = datasets::build_forest(&settings.data_dir, &options.only, settings.chunk_size);
    let tasks: usize = forest.iter().map(|c| c.task_count()).sum();

    let pool = create_pool(&settings.database).await?;
    health_check(&pool).await?;

    if !options.skip_schema {
        schema::init_db(&pool).await?;
    }

    let mut seeder = Seeder::new(pool.clone());
    if options.progress {
        seeder = seeder.with_progress(TerminalProgress::new());
    }

    info!(
        tasks,
        data_dir = %settings.data_dir.display(),
        chunk_size = settings.chunk_size,
        "Seeding database"
    );

    let started = Instant::now();
    let result = seeder.run(cancel, forest).await;
    pool.close().await;
    result?;

    let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
    println!("Completed in {:?}", elapsed);

    Ok(SeedSummary { tasks, elapsed })
}
