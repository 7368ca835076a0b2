//! Configuration management for the pgseed CLI
//!
//! Settings come from (lowest to highest precedence) built-in defaults, the
//! process environment (a `.env` file is loaded first) and command-line flags.

use pgseed::db::{
    DbConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS,
};
use pgseed::DEFAULT_CHUNK_SIZE;
use pgseed_common::SeedCommonError;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Result;
use crate::Cli;

/// Default directory holding the `.gz` data files.
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: DbConfig,
    pub data_dir: PathBuf,
    pub chunk_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Settings {
    /// Load from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Self {
            database: DbConfig {
                url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
                min_connections: parse_var(&lookup, "DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or(DEFAULT_MIN_CONNECTIONS),
                connect_timeout_secs: parse_var(&lookup, "DATABASE_CONNECT_TIMEOUT")?
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            },
            data_dir: lookup("PGSEED_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            chunk_size: parse_var(&lookup, "PGSEED_CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Apply command-line overrides and re-validate
    pub fn with_cli(mut self, cli: &Cli) -> Result<Self> {
        if let Some(ref url) = cli.database_url {
            self.database.url = url.clone();
        }

        if let Some(ref dir) = cli.data_dir {
            self.data_dir = dir.clone();
        }

        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = chunk_size;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.database.validate().map_err(SeedCommonError::config)?;

        if self.chunk_size == 0 {
            return Err(SeedCommonError::config("chunk size must be at least 1").into());
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            SeedCommonError::config(format!("invalid value '{}' for {}: {}", raw, key, e)).into()
        }),
    }
}
