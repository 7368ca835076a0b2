//! Seeding errors
//!
//! Every failure carries the location of the file whose task produced it.
//! All of them are fatal to the run they happen in.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for seeding operations
pub type SeedResult<T> = std::result::Result<T, SeedError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to open '{}': {source}", location.display())]
    Open {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to get number of lines in '{}': {source}", location.display())]
    Count {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read lines from '{}': {source}", location.display())]
    Read {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to handle line {line} of '{}': {source}", location.display())]
    Decode {
        location: PathBuf,
        line: u64,
        #[source]
        source: BoxError,
    },

    #[error("failed to execute batch for '{}': {source}", location.display())]
    Execute {
        location: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to close batch for '{}': {source}", location.display())]
    Close {
        location: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("seeding cancelled")]
    Cancelled,

    #[error("seed task panicked: {0}")]
    TaskPanicked(String),
}

impl SeedError {
    pub(crate) fn decode(location: PathBuf, line: u64, source: anyhow::Error) -> Self {
        Self::Decode {
            location,
            line,
            source: source.into(),
        }
    }

    /// True when this is the secondary error a task returns after observing
    /// someone else's failure (or the caller's cancellation).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SeedError::Cancelled)
    }

    /// The file whose task produced this error, if any
    pub fn location(&self) -> Option<&std::path::Path> {
        match self {
            SeedError::Open { location, .. }
            | SeedError::Count { location, .. }
            | SeedError::Read { location, .. }
            | SeedError::Decode { location, .. }
            | SeedError::Execute { location, .. }
            | SeedError::Close { location, .. } => Some(location),
            SeedError::Cancelled | SeedError::TaskPanicked(_) => None,
        }
    }
}
