//! pgseed - ordered, concurrent database seeding from line-delimited files
//!
//! A seed run is a forest of [`SeedConfig`]s. Every task streams its file in
//! fixed-size chunks, turns each chunk into one [`Batch`] of upserts, and
//! commits that batch atomically. Sibling tasks run concurrently; a task's
//! children only start once its whole file has been committed. The first
//! failure anywhere cancels the rest of the run.
//!
//! # Example
//!
//! ```no_run
//! use pgseed::{Batch, SeedConfig, Seeder};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(pool: sqlx::PgPool) -> anyhow::Result<()> {
//! let users = SeedConfig::new(
//!     "data/users.gz",
//!     |batch: &mut Batch, line: &[u8]| {
//!         let name = std::str::from_utf8(line)?.to_string();
//!         batch.queue(sqlx::query(r#"INSERT INTO "User" ("name") VALUES ($1)"#).bind(name));
//!         Ok(())
//!     },
//! );
//!
//! Seeder::new(pool)
//!     .run(CancellationToken::new(), vec![users])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod progress;
pub mod seeder;
pub mod source;

pub use batch::{Batch, BatchError, BatchWriter, PgBatchWriter};
pub use config::{LineHandler, SeedConfig, DEFAULT_CHUNK_SIZE};
pub use error::{SeedError, SeedResult};
pub use progress::{ProgressReporter, ProgressUnit, TerminalProgress};
pub use seeder::Seeder;
pub use source::{FileLineSource, LineReader, LineSource};
