//! Table bootstrap
//!
//! Every statement is idempotent, so `init_db` can run before each seed.

use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::{CliError, Result};

const CREATE_USER: &str = r#"
CREATE TABLE IF NOT EXISTS "User" (
    "id" INT NOT NULL,
    "name" TEXT NOT NULL,

    CONSTRAINT "User_pkey" PRIMARY KEY ("id")
)"#;

const CREATE_ESRI_LANDFORM_POLYGON: &str = r#"
CREATE TABLE IF NOT EXISTS "EsriLandformPolygon" (
    "id" TEXT NOT NULL,
    "featureCodeId" INTEGER NOT NULL,
    "gazId" INTEGER NOT NULL,
    "name" TEXT NOT NULL,
    "geoJSON" JSONB NOT NULL,

    CONSTRAINT "EsriLandformPolygon_pkey" PRIMARY KEY ("id")
)"#;

const CREATE_US_STATE: &str = r#"
CREATE TABLE IF NOT EXISTS "UsState" (
    "id" TEXT NOT NULL,
    "fipsCode" TEXT NOT NULL,
    "alpha" TEXT NOT NULL,
    "name" TEXT NOT NULL,
    "shapeGeoJSON" JSONB NOT NULL,
    "districtOfColumbiaId" TEXT,

    CONSTRAINT "UsState_pkey" PRIMARY KEY ("id")
)"#;

const CREATE_US_COUNTY: &str = r#"
CREATE TABLE IF NOT EXISTS "UsCounty" (
    "id" TEXT NOT NULL,
    "stcoFipsCode" TEXT NOT NULL,
    "shortName" TEXT NOT NULL,
    "longName" TEXT NOT NULL,
    "deprecated" BOOLEAN NOT NULL DEFAULT false,
    "shapeGeoJSON" JSONB NOT NULL,
    "stateId" TEXT,
    "districtOfColumbiaId" TEXT,
    "territoryId" TEXT,

    CONSTRAINT "UsCounty_pkey" PRIMARY KEY ("id")
)"#;

// ADD CONSTRAINT has no IF NOT EXISTS form
const ADD_US_COUNTY_STATE_FKEY: &str = r#"
DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'UsCounty_stateId_fkey') THEN
        ALTER TABLE "UsCounty" ADD CONSTRAINT "UsCounty_stateId_fkey"
            FOREIGN KEY ("stateId") REFERENCES "UsState"("id") ON DELETE SET NULL ON UPDATE CASCADE;
    END IF;
END;
$$"#;

/// Bootstrap statements in execution order, each with what it creates
pub const STATEMENTS: [(&str, &str); 5] = [
    ("user table", CREATE_USER),
    ("esri landform polygon table", CREATE_ESRI_LANDFORM_POLYGON),
    ("us state table", CREATE_US_STATE),
    ("us county table", CREATE_US_COUNTY),
    ("us state reference key", ADD_US_COUNTY_STATE_FKEY),
];

/// Create the seeded tables and the county to state foreign key
pub async fn init_db(pool: &PgPool) -> Result<()> {
    for (object, sql) in STATEMENTS {
        debug!(object, "Applying schema statement");
        sqlx::raw_sql(sql)
            .execute(pool)
            .await
            .map_err(|source| CliError::Schema { object, source })?;
    }

    info!(statements = STATEMENTS.len(), "Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_idempotent() {
        for (object, sql) in STATEMENTS {
            assert!(
                sql.contains("IF NOT EXISTS"),
                "{object} would fail on a second run"
            );
        }
    }

    #[test]
    fn test_foreign_key_comes_after_both_tables() {
        let position = |name: &str| STATEMENTS.iter().position(|(object, _)| *object == name);
        let fkey = position("us state reference key").unwrap();
        assert!(position("us state table").unwrap() < fkey);
        assert!(position("us county table").unwrap() < fkey);
    }
}
