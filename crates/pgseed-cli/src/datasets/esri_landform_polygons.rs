//! `esri-landform-polygons.gz`: one GeoJSON feature per line, keyed by the
//! feature's permanent identifier

use anyhow::Context;
use pgseed::{Batch, SeedConfig};
use serde::Deserialize;
use std::path::PathBuf;

use super::CHUNK_SIZE;
use crate::ids;

const UPSERT_ESRI_LANDFORM_POLYGON: &str = r#"
INSERT INTO "EsriLandformPolygon" ("id", "name", "featureCodeId", "gazId", "geoJSON")
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT ("id") DO UPDATE SET
    "name" = $2,
    "featureCodeId" = $3,
    "gazId" = $4,
    "geoJSON" = $5
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Properties {
    permanent_identifier: String,
    name: String,
    fcode: i32,
    gaz_id: i32,
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
    let feature: Feature = serde_json::from_slice(line)
        .context("failed to parse esri landform polygon feature from line")?;
    let Feature {
        properties,
        geometry,
    } = feature;

    let id = ids::esri_landform_polygon_id(&properties.permanent_identifier);

    batch.queue(
        sqlx::query(UPSERT_ESRI_LANDFORM_POLYGON)
            .bind(id.to_string())
            .bind(properties.name)
            .bind(properties.fcode)
            .bind(properties.gaz_id)
            .bind(geometry),
    );
    Ok(())
}
