//! Deterministic record IDs
//!
//! Every geographic record gets a name-based (SHA-1, version 5) UUID derived
//! from its natural key, so re-seeding the same file upserts the same rows.

use uuid::{uuid, Uuid};

pub const ESRI_LANDFORM_POLYGON_NS: Uuid = uuid!("e0fefc56-9345-439a-a85e-164e447dfa2a");

pub const US_STATE_NS: Uuid = uuid!("3c5b1e0a-6f2d-4b8e-9a47-d1f0c2e8b5a6");

pub const US_COUNTY_NS: Uuid = uuid!("8b3fa54b-f47d-4e85-a177-962ce30129cf");

/// Postal abbreviations of the inhabited territories
pub const TERRITORY_ABBREVIATIONS: [&str; 5] = ["GU", "PR", "VI", "AS", "MP"];

pub const DISTRICT_OF_COLUMBIA: &str = "DC";

pub fn esri_landform_polygon_id(permanent_identifier: &str) -> Uuid {
    Uuid::new_v5(&ESRI_LANDFORM_POLYGON_NS, permanent_identifier.as_bytes())
}

pub fn us_state_id(stusab: &str) -> Uuid {
    Uuid::new_v5(&US_STATE_NS, stusab.as_bytes())
}

/// Keyed by the county's long name and its state, e.g. `Autauga County,AL`
pub fn us_county_id(long_name: &str, stusab: &str) -> Uuid {
    Uuid::new_v5(&US_COUNTY_NS, format!("{},{}", long_name, stusab).as_bytes())
}

pub fn is_territory(stusab: &str) -> bool {
    TERRITORY_ABBREVIATIONS.contains(&stusab)
}

/// True for the 50 states; DC and the territories have no `UsState` row
pub fn is_state(stusab: &str) -> bool {
    stusab != DISTRICT_OF_COLUMBIA && !is_territory(stusab)
}
