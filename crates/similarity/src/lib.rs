//! # Similarity Crate
//!
//! The similarity engines the recommenders are built on.
//!
//! ## Components
//!
//! ### Content similarity
//! - **documents**: turn a binary genre row into a genre "document"
//! - **tfidf**: TF-IDF vectorizer over those documents
//! - **cosine**: dense item x item cosine similarity matrix
//!
//! ### Collaborative similarity
//! - **collaborative**: Euclidean and Pearson similarity with significance
//!   weighting, `top_matches`, and the item-item similarity mapping
//! - **store**: save/load the item-item mapping
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{build_documents, CosineSimilarityMatrix, CollaborativeConfig,
//!                  SimilarityMethod, CancellationToken, calculate_similar_items};
//!
//! let docs = build_documents(&dataset.features, &dataset.genres);
//! let cosine = CosineSimilarityMatrix::from_documents(&docs);
//!
//! let config = CollaborativeConfig::new(SimilarityMethod::Pearson);
//! let item_sim = calculate_similar_items(&dataset.ratings, &config, &CancellationToken::new())?;
//! ```

pub mod cancel;
pub mod collaborative;
pub mod cosine;
pub mod documents;
pub mod error;
pub mod store;
pub mod tfidf;

pub use cancel::CancellationToken;
pub use collaborative::{
    calculate_similar_items, sim_distance, sim_pearson, top_matches, CollaborativeConfig,
    ItemItemSimilarity, Neighbors, SimilarityMethod,
};
pub use cosine::{CosineSimilarityMatrix, SimilaritySummary};
pub use documents::{build_document, build_documents};
pub use error::{Result, SimilarityError, StoreError};
pub use store::{store_key, JsonFileStore, SimilarityStore};
pub use tfidf::TfidfVectorizer;

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{FeatureMatrix, GenreIndex};

    #[test]
    fn test_documents_to_cosine() {
        let features = FeatureMatrix::new(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
        let genres = GenreIndex::new(["Action", "Comedy"]);

        let docs = build_documents(&features, &genres);
        assert_eq!(docs, vec!["Action", "Comedy", "Action Comedy"]);

        let cosine = CosineSimilarityMatrix::from_documents(&docs);
        assert_eq!(cosine.len(), 3);
        assert_eq!(cosine.get(0, 1), 0.0);
        assert!(cosine.get(0, 2) > 0.0);
    }
}
