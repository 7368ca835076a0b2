//! `us-counties.gz`: one GeoJSON feature per line
//!
//! Counties reference their state by its derived ID, so this dataset is
//! seeded as a child of `us-states`.

use anyhow::Context;
use pgseed::{Batch, SeedConfig};
use serde::Deserialize;
use std::path::PathBuf;

use super::CHUNK_SIZE;
use crate::ids;

const UPSERT_US_COUNTY: &str = r#"
INSERT INTO "UsCounty" (
    "id",
    "stateId",
    "territoryId",
    "stcoFipsCode",
    "longName",
    "shortName",
    "shapeGeoJSON",
    "deprecated"
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT ("id") DO UPDATE SET
    "stateId" = $2,
    "territoryId" = $3,
    "stcoFipsCode" = $4,
    "longName" = $5,
    "shortName" = $6,
    "shapeGeoJSON" = $7,
    "deprecated" = $8
"#;

#[derive(Debug, Deserialize)]
struct Properties {
    stusab: String,
    geoid: String,
    namelsad: String,
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

/// `stateId` for a county; NULL for DC and territory counties
fn state_id(stusab: &str) -> Option<String> {
    ids::is_state(stusab).then(|| ids::us_state_id(stusab).to_string())
}

fn handle_line(batch: &mut Batch, line: &[u8]) -> anyhow::Result<()> {
    let feature: Feature =
        serde_json::from_slice(line).context("failed to parse us county feature from line")?;
    let Feature {
        properties,
        geometry,
    } = feature;

    let id = ids::us_county_id(&properties.namelsad, &properties.stusab);

    batch.queue(
        sqlx::query(UPSERT_US_COUNTY)
            .bind(id.to_string())
            .bind(state_id(&properties.stusab))
            .bind(None::<String>)
            .bind(properties.geoid)
            .bind(properties.namelsad)
            .bind(properties.name)
            .bind(geometry)
            .bind(false),
    );
    Ok(())
}
