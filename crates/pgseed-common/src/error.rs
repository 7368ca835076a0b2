//! Error types for the pgseed tooling layer

use thiserror::Error;

/// Result type alias for tooling operations
pub type Result<T> = std::result::Result<T, SeedCommonError>;

/// Errors raised outside the seeding engine: configuration, dataset
/// selection and database connectivity in the CLI.
#[derive(Error, Debug)]
pub enum SeedCommonError {
    #[error("Database error: {0}. Check DATABASE_URL and that the server is reachable.")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown dataset: '{0}'")]
    UnknownDataset(String),
}

impl SeedCommonError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
