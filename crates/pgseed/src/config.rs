//! Seed task configuration

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::batch::Batch;

/// Number of lines per batch when a task leaves `chunk_size` at zero
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Decodes one raw line and queues zero or more statements on the batch.
///
/// Returning an error stops the whole run.
pub type LineHandler = Arc<dyn Fn(&mut Batch, &[u8]) -> anyhow::Result<()> + Send + Sync>;

/// One file to seed, plus the files that must wait for it.
///
/// Immutable once handed to [`crate::Seeder::run`]; cloning is cheap since the
/// handler is shared.
#[derive(Clone)]
pub struct SeedConfig {
    /// Path of the file, resolved by the seeder's line source
    pub location: PathBuf,
    /// Lines per batch; zero means [`DEFAULT_CHUNK_SIZE`]
    pub chunk_size: usize,
    pub handler: LineHandler,
    /// Run concurrently with each other once this file is fully committed
    pub children: Vec<SeedConfig>,
}

impl SeedConfig {
    pub fn new<F>(location: impl Into<PathBuf>, handler: F) -> Self
    where
        F: Fn(&mut Batch, &[u8]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::from_handler(location, Arc::new(handler))
    }

    /// Build from an already shared handler
    pub fn from_handler(location: impl Into<PathBuf>, handler: LineHandler) -> Self {
        Self {
            location: location.into(),
            chunk_size: 0,
            handler,
            children: Vec::new(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_children(mut self, children: Vec<SeedConfig>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: SeedConfig) -> Self {
        self.children.push(child);
        self
    }

    pub fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }

    /// File name up to its first dot: `data/us-states.json.gz` -> `us-states`
    pub fn label(&self) -> String {
        label_for(&self.location)
    }

    /// Number of tasks in this subtree, including this one
    pub fn task_count(&self) -> usize {
        1 + self.children.iter().map(SeedConfig::task_count).sum::<usize>()
    }
}

impl fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedConfig")
            .field("location", &self.location)
            .field("chunk_size", &self.chunk_size)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

pub(crate) fn label_for(location: &Path) -> String {
    let base = location
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.to_string_lossy().into_owned());

    match base.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> SeedConfig {
        SeedConfig::new("data/us-states.gz", |_, _| Ok(()))
    }

    #[test]
    fn test_zero_chunk_size_uses_default() {
        assert_eq!(noop().effective_chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(noop().with_chunk_size(7).effective_chunk_size(), 7);
    }

    #[test]
    fn test_label_strips_directory_and_extensions() {
        assert_eq!(noop().label(), "us-states");
        assert_eq!(label_for(Path::new("/tmp/esri-landform-polygons.geojson.gz")), "esri-landform-polygons");
        assert_eq!(label_for(Path::new("users")), "users");
        assert_eq!(label_for(Path::new(".hidden")), "");
    }

    #[test]
    fn test_children_builders() {
        let tree = noop()
            .with_children(vec![noop(), noop()])
            .with_child(noop().with_child(noop()));

        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.task_count(), 5);
    }
}
