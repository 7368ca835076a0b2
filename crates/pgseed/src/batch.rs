//! Outgoing batches and the writer that commits them
//!
//! A [`Batch`] collects the statements produced for one chunk of lines. The
//! [`BatchWriter`] submits it as a single atomic unit; [`PgBatchWriter`] does
//! that with one transaction per batch on a shared [`PgPool`].

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::query::Query;
use sqlx::{Execute, Postgres};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A parameterised statement ready to be queued on a [`Batch`]
pub type Statement = Query<'static, Postgres, PgArguments>;

/// Statements accumulated for exactly one chunk.
///
/// Created empty by the seeder for each chunk and consumed by the writer.
#[derive(Default)]
pub struct Batch {
    statements: Vec<Statement>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement; statements run in the order they were queued
    pub fn queue(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// SQL text of the queued statements, in order
    pub fn statements(&self) -> Vec<&str> {
        self.statements.iter().map(|s| s.sql()).collect()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

impl std::fmt::Debug for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("statements", &self.statements.len())
            .finish()
    }
}

/// Why a batch was not committed
#[derive(Error, Debug)]
pub enum BatchError {
    /// Dispatching or running a statement failed; nothing from the batch is kept
    #[error("{0}")]
    Execute(#[source] sqlx::Error),

    /// Every statement ran but the batch could not be finalised
    #[error("{0}")]
    Close(#[source] sqlx::Error),

    /// Cancellation was observed before the batch was dispatched
    #[error("cancelled before submission")]
    Cancelled,
}

/// Submits batches all-or-nothing. Must be safe to call from many tasks at once.
#[async_trait]
pub trait BatchWriter: Send + Sync {
    async fn submit(&self, batch: Batch, cancel: &CancellationToken) -> Result<(), BatchError>;
}

/// Commits each batch in its own transaction on a shared connection pool
#[derive(Debug, Clone)]
pub struct PgBatchWriter {
    pool: PgPool,
}

impl PgBatchWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BatchWriter for PgBatchWriter {
    async fn submit(&self, batch: Batch, cancel: &CancellationToken) -> Result<(), BatchError> {
        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }

        if batch.is_empty() {
            return Ok(());
        }

        let count = batch.len();
        let mut tx = self.pool.begin().await.map_err(BatchError::Execute)?;

        // Dropping `tx` on an early return rolls the whole batch back
        for statement in batch.into_statements() {
            statement
                .execute(&mut *tx)
                .await
                .map_err(BatchError::Execute)?;
        }

        tx.commit().await.map_err(BatchError::Close)?;

        debug!(statements = count, "Batch committed");
        Ok(())
    }
}
