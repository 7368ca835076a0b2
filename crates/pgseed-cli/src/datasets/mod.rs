//! Bundled datasets and the order they are seeded in
//!
//! Each dataset module exposes a builder `fn(location, children) -> SeedConfig`
//! whose handler turns one JSON line into one upsert. [`build_forest`] wires
//! them into the dependency forest:
//!
//! ```text
//! users
//! us-states
//! └── us-counties
//! esri-landform-polygons
//! ```

use pgseed::SeedConfig;
use pgseed_common::SeedCommonError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod esri_landform_polygons;
pub mod us_counties;
pub mod us_states;
pub mod users;

/// Lines per batch for every bundled dataset
pub const CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Users,
    UsStates,
    UsCounties,
    EsriLandformPolygons,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Users,
        Dataset::UsStates,
        Dataset::UsCounties,
        Dataset::EsriLandformPolygons,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Users => "users",
            Dataset::UsStates => "us-states",
            Dataset::UsCounties => "us-counties",
            Dataset::EsriLandformPolygons => "esri-landform-polygons",
        }
    }

    /// Location of this dataset's file under `data_dir`
    pub fn location(self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.gz", self.name()))
    }

    /// Datasets that may only start once this one is fully committed
    pub fn dependents(self) -> &'static [Dataset] {
        match self {
            Dataset::UsStates => &[Dataset::UsCounties],
            _ => &[],
        }
    }

    pub fn config(self, data_dir: &Path, children: Vec<SeedConfig>) -> SeedConfig {
        let location = self.location(data_dir);
        match self {
            Dataset::Users => users::new(location, children),
            Dataset::UsStates => us_states::new(location, children),
            Dataset::UsCounties => us_counties::new(location, children),
            Dataset::EsriLandformPolygons => esri_landform_polygons::new(location, children),
        }
    }

    fn is_root(self) -> bool {
        !Dataset::ALL.iter().any(|d| d.dependents().contains(&self))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = SeedCommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Dataset::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| SeedCommonError::UnknownDataset(s.to_string()))
    }
}

/// Build the seed forest for `only` (everything when empty).
///
/// A dataset that is not selected is skipped, and its selected dependents
/// take its place in the forest. `chunk_size` overrides the per-dataset
/// default when non-zero.
pub fn build_forest(data_dir: &Path, only: &[Dataset], chunk_size: usize) -> Vec<SeedConfig> {
    let selected = |d: Dataset| only.is_empty() || only.contains(&d);

    Dataset::ALL
        .into_iter()
        .filter(|d| d.is_root())
        .flat_map(|d| build_node(d, data_dir, &selected, chunk_size))
        .collect()
}

fn build_node(
    dataset: Dataset,
    data_dir: &Path,
    selected: &dyn Fn(Dataset) -> bool,
    chunk_size: usize,
) -> Vec<SeedConfig> {
    let children: Vec<SeedConfig> = dataset
        .dependents()
        .iter()
        .flat_map(|&child| build_node(child, data_dir, selected, chunk_size))
        .collect();

    if !selected(dataset) {
        return children;
    }

    let config = dataset.config(data_dir, children);
    if chunk_size > 0 {
        vec![config.with_chunk_size(chunk_size)]
    } else {
        vec![config]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(configs: &[SeedConfig]) -> Vec<(String, Vec<String>)> {
        configs
            .iter()
            .map(|c| (c.label(), c.children.iter().map(|k| k.label()).collect()))
            .collect()
    }

    #[test]
    fn test_full_forest() {
        let forest = build_forest(Path::new("data"), &[], 0);

        assert_eq!(
            shape(&forest),
            vec![
                ("users".to_string(), vec![]),
                ("us-states".to_string(), vec!["us-counties".to_string()]),
                ("esri-landform-polygons".to_string(), vec![]),
            ]
        );
        assert_eq!(forest[1].location, PathBuf::from("data/us-states.gz"));
        assert_eq!(forest[1].children[0].location, PathBuf::from("data/us-counties.gz"));
        assert_eq!(forest.iter().map(SeedConfig::task_count).sum::<usize>(), 4);
        assert!(forest.iter().all(|c| c.chunk_size == CHUNK_SIZE));
    }

    #[test]
    fn test_only_keeps_subtree_of_selected_parent() {
        let forest = build_forest(Path::new("data"), &[Dataset::UsStates, Dataset::UsCounties], 0);
        assert_eq!(
            shape(&forest),
            vec![("us-states".to_string(), vec!["us-counties".to_string()])]
        );

        let forest = build_forest(Path::new("data"), &[Dataset::UsStates], 0);
        assert_eq!(shape(&forest), vec![("us-states".to_string(), vec![])]);
    }

    #[test]
    fn test_unselected_parent_promotes_children() {
        let forest = build_forest(Path::new("data"), &[Dataset::UsCounties, Dataset::Users], 0);
        assert_eq!(
            shape(&forest),
            vec![
                ("users".to_string(), vec![]),
                ("us-counties".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_chunk_size_override() {
        let forest = build_forest(Path::new("data"), &[], 10);
        assert_eq!(forest[1].chunk_size, 10);
        assert_eq!(forest[1].children[0].chunk_size, 10);
    }

    #[test]
    fn test_dataset_names_parse() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.name().parse::<Dataset>().unwrap(), dataset);
        }
        assert_eq!("US_States".parse::<Dataset>().unwrap(), Dataset::UsStates);

        let err = "parks".parse::<Dataset>().unwrap_err();
        assert!(matches!(err, SeedCommonError::UnknownDataset(ref name) if name == "parks"));
    }
}
