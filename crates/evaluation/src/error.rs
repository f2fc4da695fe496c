//! Error types for the evaluation crate.

use recommender::RecommendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvaluationError {
    /// There are no ratings to hold out
    #[error("Rating matrix has no ratings to evaluate")]
    EmptyDataset,

    /// The cancellation token fired between users
    #[error("Evaluation cancelled after {processed} of {total} users")]
    Cancelled { processed: usize, total: usize },

    /// A structural scoring failure (unknown user, title missing from the catalog)
    #[error("Scoring failed: {0}")]
    Recommend(#[from] RecommendError),

    #[error("Result sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Result sink serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
