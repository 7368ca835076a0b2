//! The seeding engine
//!
//! [`Seeder::run`] drives a forest of [`SeedConfig`]s:
//!
//! 1. every config at one level is spawned onto its own tokio task
//! 2. each task streams its file chunk by chunk: read, decode every line into
//!    a fresh [`Batch`], submit the batch, report progress
//! 3. once a task's file is exhausted it runs its children the same way and
//!    only then reports back
//!
//! All tasks of a run share one [`CancellationToken`]. The first failure
//! cancels it; other tasks notice before their next read or submission and
//! stop with [`SeedError::Cancelled`]. A chunk that is already being written
//! is allowed to finish. `run` returns once every spawned task has ended,
//! with the first real error if there was one.

use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::batch::{Batch, BatchError, BatchWriter, PgBatchWriter};
use crate::config::SeedConfig;
use crate::error::{SeedError, SeedResult};
use crate::progress::ProgressReporter;
use crate::source::{FileLineSource, LineSource};

type GroupFuture = Pin<Box<dyn Future<Output = SeedResult<()>> + Send + 'static>>;

/// Runs seed forests against a line source and a batch writer.
///
/// Cloning is cheap; clones share the source, writer and progress reporter.
#[derive(Clone)]
pub struct Seeder {
    source: Arc<dyn LineSource>,
    writer: Arc<dyn BatchWriter>,
    progress: Option<Arc<dyn ProgressReporter>>,
}

impl Seeder {
    /// Seeder reading local files and writing one transaction per chunk to `pool`
    pub fn new(pool: PgPool) -> Self {
        Self::with_components(FileLineSource::new(), PgBatchWriter::new(pool))
    }

    pub fn with_components(
        source: impl LineSource + 'static,
        writer: impl BatchWriter + 'static,
    ) -> Self {
        Self {
            source: Arc::new(source),
            writer: Arc::new(writer),
            progress: None,
        }
    }

    /// Report per-task progress; without this each task logs a completion line
    pub fn with_progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Arc::new(reporter));
        self
    }

    pub fn has_progress(&self) -> bool {
        self.progress.is_some()
    }

    /// Seed every config in `configs` concurrently, each followed by its children.
    ///
    /// Cancelling `cancel` stops the run the same way an internal failure does.
    /// Failures are returned, not logged; reporting them is up to the caller.
    pub async fn run(&self, cancel: CancellationToken, configs: Vec<SeedConfig>) -> SeedResult<()> {
        self.run_group(cancel.child_token(), configs).await
    }

    fn run_group(&self, cancel: CancellationToken, configs: Vec<SeedConfig>) -> GroupFuture {
        let seeder = self.clone();

        Box::pin(async move {
            let mut tasks = JoinSet::new();

            for config in configs {
                let seeder = seeder.clone();
                let cancel = cancel.clone();

                tasks.spawn(async move {
                    let result = seeder.run_task(&cancel, config).await;
                    if result.is_err() {
                        cancel.cancel();
                    }
                    result
                });
            }

            let mut first_error: Option<SeedError> = None;

            // Drain everything, even after a failure, so no task outlives the run
            while let Some(joined) = tasks.join_next().await {
                let result = joined.unwrap_or_else(|e| Err(SeedError::TaskPanicked(e.to_string())));

                if let Err(err) = result {
                    cancel.cancel();
                    first_error = Some(prefer_error(first_error, err));
                }
            }

            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    #[instrument(name = "seed", skip_all, fields(label = %config.label()))]
    async fn run_task(&self, cancel: &CancellationToken, config: SeedConfig) -> SeedResult<()> {
        if cancel.is_cancelled() {
            return Err(SeedError::Cancelled);
        }

        let location = config.location.clone();
        let label = config.label();

        let mut reader = self
            .source
            .open(&location)
            .await
            .map_err(|source| SeedError::Open {
                location: location.clone(),
                source,
            })?;

        let unit = match &self.progress {
            Some(progress) => {
                let total = reader
                    .total_lines()
                    .await
                    .map_err(|source| SeedError::Count {
                        location: location.clone(),
                        source,
                    })?;
                Some(progress.register_unit(&label, total))
            }
            None => None,
        };

        let chunk_size = config.effective_chunk_size();
        let started = Instant::now();
        let mut lines_seen: u64 = 0;
        let mut chunks: u64 = 0;

        info!(location = %location.display(), chunk_size, "Seeding started");

        loop {
            if cancel.is_cancelled() {
                debug!(chunks, "Cancellation observed before read");
                return Err(SeedError::Cancelled);
            }

            let chunk_started = Instant::now();
            let chunk = reader
                .read_lines(chunk_size)
                .await
                .map_err(|source| SeedError::Read {
                    location: location.clone(),
                    source,
                })?;

            if chunk.is_empty() {
                break;
            }

            let mut batch = Batch::new();
            for line in &chunk {
                lines_seen += 1;
                (config.handler)(&mut batch, line.as_slice())
                    .map_err(|source| SeedError::decode(location.clone(), lines_seen, source))?;
            }

            if cancel.is_cancelled() {
                debug!(chunks, "Cancellation observed before submission");
                return Err(SeedError::Cancelled);
            }

            let statements = batch.len();
            self.writer
                .submit(batch, cancel)
                .await
                .map_err(|err| match err {
                    BatchError::Execute(source) => SeedError::Execute {
                        location: location.clone(),
                        source,
                    },
                    BatchError::Close(source) => SeedError::Close {
                        location: location.clone(),
                        source,
                    },
                    BatchError::Cancelled => SeedError::Cancelled,
                })?;

            chunks += 1;
            debug!(chunk = chunks, lines = chunk.len(), statements, "Chunk committed");

            if let Some(unit) = &unit {
                unit.advance(chunk.len() as u64, chunk_started.elapsed());
            }
        }

        match unit {
            Some(unit) => unit.complete_and_wait().await,
            None => info!(
                lines = lines_seen,
                "Finished seeding {} in {:?}",
                label,
                round_to_millis(started.elapsed())
            ),
        }

        if !config.children.is_empty() {
            debug!(children = config.children.len(), "Starting dependent seeds");
        }

        self.run_group(cancel.clone(), config.children).await
    }
}

impl std::fmt::Debug for Seeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seeder")
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

/// Keep the first failure, unless it was only a reaction to cancellation and
/// a real cause shows up later.
fn prefer_error(current: Option<SeedError>, next: SeedError) -> SeedError {
    match current {
        None => next,
        Some(current) if current.is_cancelled() && !next.is_cancelled() => next,
        Some(current) => current,
    }
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
