//! `users.gz`: one `{"id": 1, "name": "..."}` object per line

use anyhow::Context;
use pgseed::{Batch, SeedConfig};
use serde::Deserialize;
use std::path::PathBuf;

use super::CHUNK_SIZE;

const UPSERT_USER: &str = r#"
INSERT INTO "User" ("id", "name")
VALUES ($1, $2)
ON CONFLICT ("id") DO UPDATE SET
    "name" = $2
"#;

#[derive(Debug, Deserialize)]
struct User {
    id: i32,
    name: String,
}

pub fn new(location: impl Into<PathBuf>, children: Vec<SeedConfig>) -> SeedConfig {
    SeedConfig::new(location, handle_line)
        .with_chunk_size(CHUNK_SIZE)
        .with_children(children)
}

fn handle_line(batch: &mut Batch, line: &[u8]) -> anyhow::Result<()> {
    let user: User = serde_json::from_slice(line).context("failed to parse user from line")?;

    batch.queue(sqlx::query(UPSERT_USER).bind(user.id).bind(user.name));
    Ok(())
}
