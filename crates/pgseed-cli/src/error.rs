//! Error types for the pgseed CLI
//!
//! Messages are user-facing; where there is an obvious next step they say so.

use pgseed::SeedError;
use pgseed_common::SeedCommonError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration, IO or connection problems shared with the tooling layer
    #[error(transparent)]
    Common(#[from] SeedCommonError),

    /// A table or constraint could not be created
    #[error("Failed to create {object}: {source}. Check that the database user may run DDL.")]
    Schema {
        object: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The seed run stopped
    #[error("Failed to seed database: {0}")]
    Seed(#[from] SeedError),
}

impl CliError {
    /// True when the run stopped because it was interrupted rather than failed
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CliError::Seed(err) if err.is_cancelled())
    }
}

impl From<sqlx::Error> for CliError {
    fn from(err: sqlx::Error) -> Self {
        CliError::Common(SeedCommonError::Database(err))
    }
}
