//! `us-states.gz`: one GeoJSON feature per line
//!
//! Features for DC and the territories are in the source data but have no
//! `UsState` row; their lines queue nothing.

use anyhow::Context;
use pgseed::{Batch, SeedConfig};
use serde::Deserialize;
use std::path::PathBuf;

use super::CHUNK_SIZE;
use crate::ids;

const UPSERT_US_STATE: &str = r#"
INSERT INTO "UsState" ("id", "fipsCode", "alpha", "name", "shapeGeoJSON")
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT ("id") DO UPDATE SET
    "fipsCode" = $2,
    "alpha" = $3,
    "name" = $4,
    "shapeGeoJSON" = $5
"#;

#[derive(Debug, Deserialize)]
struct Properties {
    stusab: String,
    geoid: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    geometry: serde_json::Value,
}

pub fn new(location: impl Into<PathBuf>, children: Vec<SeedConfig>) -> SeedConfig {
    SeedConfig::new(location, handle_line)
        .with_chunk_size(CHUNK_SIZE)
        .with_children(children)
}

fn handle_line(batch: &mut Batch, line: &[u8]) -> anyhow::Result<()> {
    let feature: Feature =
        serde_json::from_slice(line).context("failed to parse us state feature from line")?;
    let Feature {
        properties,
        geometry,
    } = feature;

    if !ids::is_state(&properties.stusab) {
        return Ok(());
    }

    let id = ids::us_state_id(&properties.stusab);

    batch.queue(
        sqlx::query(UPSERT_US_STATE)
            .bind(id.to_string())
            .bind(properties.geoid)
            .bind(properties.stusab)
            .bind(properties.name)
            .bind(geometry),
    );
    Ok(())
}
