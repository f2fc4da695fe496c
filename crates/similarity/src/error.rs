//! Error types for the similarity crate.

use thiserror::Error;

/// Errors raised while computing similarity structures
#[derive(Error, Debug)]
pub enum SimilarityError {
    /// The cancellation token fired between items
    #[error("Similarity computation cancelled after {processed} of {total} items")]
    Cancelled { processed: usize, total: usize },

    /// There is nothing to compare
    #[error("Rating matrix is empty")]
    EmptyRatings,
}

/// Errors raised by a `SimilarityStore`
#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing was ever saved under this key
    #[error("No similarity matrix saved under {key:?} ({path}); compute and write it first")]
    NotFound { key: String, path: String },

    /// Something was saved but it cannot be decoded
    #[error("Similarity matrix {key:?} is unreadable: {reason}")]
    Unreadable { key: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
