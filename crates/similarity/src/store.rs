//! Persistence of item-item similarity mappings.
//!
//! Computing the item-item mapping is the slowest step of the harness, so
//! it is written once per similarity method and read back on later runs.

use crate::collaborative::{ItemItemSimilarity, SimilarityMethod};
use crate::error::StoreError;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::info;

/// Key-value storage for item-item similarity mappings.
///
/// `load` must return exactly the mapping previously `save`d under the
/// same key, or `StoreError::NotFound` if nothing was saved.
pub trait SimilarityStore {
    fn save(&self, key: &str, similarity: &ItemItemSimilarity) -> Result<(), StoreError>;

    fn load(&self, key: &str) -> Result<ItemItemSimilarity, StoreError>;
}

/// Conventional store key for a similarity method
pub fn store_key(method: SimilarityMethod) -> String {
    match method {
        SimilarityMethod::Euclidean => "itemsim_distance".to_string(),
        SimilarityMethod::Pearson => "itemsim_pearson".to_string(),
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing a key: `<dir>/save_<key>.json`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("save_{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SimilarityStore for JsonFileStore {
    fn save(&self, key: &str, similarity: &ItemItemSimilarity) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(writer, similarity)?;
        info!("Saved {} item neighbour lists to {:?}", similarity.len(), path);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<ItemItemSimilarity, StoreError> {
        let path = self.path_for(key);
        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                key: key.to_string(),
                path: path.display().to_string(),
            },
            _ => StoreError::Io(e),
        })?;
        let similarity: ItemItemSimilarity = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StoreError::Unreadable {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        info!("Loaded {} item neighbour lists from {:?}", similarity.len(), path);
        Ok(similarity)
    }
}
