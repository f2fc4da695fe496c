//! # Data Loader Crate
//!
//! This crate loads rating datasets (MovieLens 100K and the critics set)
//! into the in-memory structures the recommenders work on.
//!
//! ## Main Components
//!
//! - **types**: `RatingMatrix`, `ItemCatalog`, `FeatureMatrix`, `GenreIndex`, `Dataset`
//! - **parser**: Parse the delimited ratings/items/genres files
//! - **index**: Assemble and validate a `Dataset`
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, DatasetLayout};
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_files(Path::new("data/ml-100k"), &DatasetLayout::movielens_100k())?;
//!
//! let ratings = dataset.ratings.get_user_ratings("340").unwrap();
//! println!("User 340 rated {} items", ratings.len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use index::DatasetLayout;
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    ItemTitle,
    UserRatings,
    // Core types
    RatingMatrix,
    ItemCatalog,
    FeatureMatrix,
    GenreIndex,
    Dataset,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_matrix_creation() {
        let ratings = RatingMatrix::new();
        assert_eq!(ratings.len(), 0);
        assert_eq!(ratings.rating_count(), 0);
        assert!(ratings.is_empty());
    }

    #[test]
    fn test_insert_and_remove_rating() {
        let mut ratings = RatingMatrix::new();
        ratings.insert("Lisa", "Superman Returns", 3.5);
        ratings.insert("Lisa", "You, Me and Dupree", 2.5);
        let before = ratings.clone();

        assert_eq!(ratings.remove("Lisa", "Superman Returns"), Some(3.5));
        assert_eq!(ratings.get("Lisa", "Superman Returns"), None);
        assert_eq!(ratings.rating_count(), 1);

        ratings.insert("Lisa", "Superman Returns", 3.5);
        assert_eq!(ratings, before);
    }

    #[test]
    fn test_remove_last_rating_keeps_user() {
        let mut ratings = RatingMatrix::new();
        ratings.insert("Toby", "Snakes on a Plane", 4.5);
        ratings.remove("Toby", "Snakes on a Plane");
        assert_eq!(ratings.len(), 1);
        assert!(ratings.get_user_ratings("Toby").unwrap().is_empty());
    }

    #[test]
    fn test_transpose() {
        let mut ratings = RatingMatrix::new();
        ratings.insert("A", "x", 5.0);
        ratings.insert("A", "y", 3.0);
        ratings.insert("B", "x", 4.0);

        let items = ratings.transpose();
        assert_eq!(items.len(), 2);
        assert_eq!(items.get("x", "B"), Some(4.0));
        assert_eq!(items.get_user_ratings("y").unwrap().len(), 1);
        assert_eq!(items.transpose(), ratings);
    }

    #[test]
    fn test_catalog_round_trip() {
        let catalog = ItemCatalog::from_titles(["Toy Story (1995)", "GoldenEye (1995)"]).unwrap();
        assert_eq!(catalog.len(), 2);
        for (id, title) in catalog.iter() {
            assert_eq!(catalog.id_of(title), Some(id));
            assert_eq!(catalog.title(id), Some(title));
        }
        assert_eq!(catalog.title(0), None);
        assert_eq!(catalog.title(3), None);
        assert_eq!(catalog.index_of("GoldenEye (1995)"), Some(1));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let result = ItemCatalog::from_titles(["A", "A"]);
        assert!(matches!(result, Err(DataLoadError::DuplicateTitle { .. })));
    }

    #[test]
    fn test_catalog_rejects_gaps() {
        let mut catalog = ItemCatalog::new();
        catalog.insert(1, "A").unwrap();
        assert!(catalog.insert(3, "C").is_err());
    }

    #[test]
    fn test_feature_matrix_validation() {
        assert!(FeatureMatrix::new(vec![vec![1, 0], vec![0, 1]]).is_ok());
        assert!(FeatureMatrix::new(vec![vec![1, 0], vec![0]]).is_err());
        assert!(FeatureMatrix::new(vec![vec![2, 0]]).is_err());
    }
}
