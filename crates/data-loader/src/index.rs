//! Dataset assembly and integrity checks.
//!
//! Ties the three parsed files together into a [`Dataset`] and checks the
//! cross-file invariants: one feature row per catalog item, one genre name
//! per feature column, and every rated title known to the catalog.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// File names and item-file layout of a dataset directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    pub ratings_file: String,
    pub items_file: String,
    pub genres_file: String,
    /// Field index of the first genre flag in the item file
    pub feature_offset: usize,
}

impl DatasetLayout {
    /// MovieLens 100K: `u.data`, `u.item`, `u.genre`
    pub fn movielens_100k() -> Self {
        Self {
            ratings_file: "u.data".to_string(),
            items_file: "u.item".to_string(),
            genres_file: "u.genre".to_string(),
            feature_offset: 5,
        }
    }

    /// The small critics dataset
    pub fn critics() -> Self {
        Self {
            ratings_file: "critics_ratings.data".to_string(),
            items_file: "critics_movies.item".to_string(),
            genres_file: "critics_movies.genre".to_string(),
            feature_offset: 5,
        }
    }
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self::movielens_100k()
    }
}

impl Dataset {
    /// Load a dataset directory
    ///
    /// Steps:
    /// 1. Parse the genre and item files in parallel
    /// 2. Parse ratings, resolving item ids through the catalog
    /// 3. Validate cross-file integrity
    pub fn load_from_files(data_dir: &Path, layout: &DatasetLayout) -> Result<Self> {
        info!("Loading dataset from {:?}", data_dir);

        let genres_path = data_dir.join(&layout.genres_file);
        let items_path = data_dir.join(&layout.items_file);
        let ratings_path = data_dir.join(&layout.ratings_file);

        let (genres, items) = rayon::join(
            || parser::parse_genres(&genres_path),
            || parser::parse_items(&items_path, layout.feature_offset),
        );
        let genres = genres?;
        let (catalog, features) = items?;
        let ratings = parser::parse_ratings(&ratings_path, &catalog)?;

        let dataset = Dataset {
            ratings,
            catalog,
            features,
            genres,
        };
        let (users, items, ratings) = dataset.counts();
        info!(
            "Loaded {} users, {} items, {} ratings, {} genres",
            users,
            items,
            ratings,
            dataset.genres.len()
        );

        dataset.validate()?;
        Ok(dataset)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - the feature matrix has one row per catalog item
    /// - the genre index names every feature column
    /// - every rated title exists in the catalog
    /// - ratings are in (0.0, 5.0]
    pub fn validate(&self) -> Result<()> {
        if self.features.len() != self.catalog.len() {
            return Err(DataLoadError::ValidationError(format!(
                "{} feature rows for {} catalog items",
                self.features.len(),
                self.catalog.len()
            )));
        }
        if !self.features.is_empty() && self.features.width() != self.genres.len() {
            return Err(DataLoadError::ValidationError(format!(
                "{} feature columns but {} genres",
                self.features.width(),
                self.genres.len()
            )));
        }
        for (_user, ratings) in self.ratings.iter() {
            for (title, &rating) in ratings {
                if self.catalog.id_of(title).is_none() {
                    return Err(DataLoadError::MissingReference {
                        entity: "Item".to_string(),
                        key: title.clone(),
                    });
                }
                if !(rating > 0.0 && rating <= 5.0) {
                    return Err(DataLoadError::InvalidValue {
                        field: "rating".to_string(),
                        value: rating.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// (users, items, ratings) counts for logging
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.ratings.len(),
            self.catalog.len(),
            self.ratings.rating_count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_critics(dir: &Path) {
        fs::write(dir.join("critics_movies.genre"), "Action|0\nComedy|1\n\n").unwrap();
        fs::write(
            dir.join("critics_movies.item"),
            "1|Lady in the Water|||x|0|1\n2|Snakes on a Plane|||x|1|0\n",
        )
        .unwrap();
        fs::write(
            dir.join("critics_ratings.data"),
            "Lisa\t1\t2.5\t0\nLisa\t2\t3.5\t0\nGene\t2\t3.5\t0\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_dataset() {
        let dir = tempfile::tempdir().unwrap();
        write_critics(dir.path());

        let dataset = Dataset::load_from_files(dir.path(), &DatasetLayout::critics()).unwrap();
        assert_eq!(dataset.counts(), (2, 2, 3));
        assert_eq!(dataset.ratings.get("Lisa", "Lady in the Water"), Some(2.5));
        assert_eq!(dataset.genres.name(0), Some("Action"));
    }

    #[test]
    fn test_validate_row_count_mismatch() {
        let dataset = Dataset {
            ratings: RatingMatrix::new(),
            catalog: ItemCatalog::from_titles(["A", "B"]).unwrap(),
            features: FeatureMatrix::new(vec![vec![1, 0]]).unwrap(),
            genres: GenreIndex::new(["Action", "Comedy"]),
        };
        assert!(matches!(
            dataset.validate(),
            Err(DataLoadError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_unknown_title() {
        let mut ratings = RatingMatrix::new();
        ratings.insert("1", "Nope", 4.0);
        let dataset = Dataset {
            ratings,
            catalog: ItemCatalog::from_titles(["A"]).unwrap(),
            features: FeatureMatrix::new(vec![vec![1]]).unwrap(),
            genres: GenreIndex::new(["Action"]),
        };
        assert!(matches!(
            dataset.validate(),
            Err(DataLoadError::MissingReference { .. })
        ));
    }

    #[test]
    fn test_load_real_dataset() {
        // Requires the MovieLens 100K files under data/ml-100k
        let data_dir = Path::new("../../data/ml-100k");

        if data_dir.exists() {
            let dataset =
                Dataset::load_from_files(data_dir, &DatasetLayout::movielens_100k()).unwrap();
            let (users, items, ratings) = dataset.counts();

            assert_eq!(users, 943);
            assert_eq!(items, 1682);
            assert_eq!(ratings, 100000);
        }
    }
}
