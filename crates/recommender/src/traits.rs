//! Core trait implemented by every scoring algorithm.

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::types::{Algorithm, Prediction, Recommendation};
use data_loader::RatingMatrix;

/// A scoring algorithm.
///
/// Recommenders own (shared handles to) their precomputed inputs and take
/// the rating matrix per call, so the evaluator can hand them a matrix
/// with one rating held out.
///
/// ## Design Note
/// - `Send + Sync` so one recommender can be shared across threads
/// - Per-item anomalies are folded into "no recommendation"; only
///   structural problems (unknown user, title missing from the catalog)
///   are errors
pub trait Recommender: Send + Sync {
    /// Which algorithm this is
    fn algorithm(&self) -> Algorithm;

    /// Configuration the recommender scores with
    fn config(&self) -> &ScoringConfig;

    /// Name for logging and trial records
    fn name(&self) -> &str {
        self.algorithm().name()
    }

    /// Ranked recommendations over every item `user` has not rated.
    fn recommend(&self, ratings: &RatingMatrix, user: &str) -> Result<Vec<Recommendation>>;

    /// Prediction for exactly `excluded`, used by leave-one-out evaluation.
    fn predict(&self, ratings: &RatingMatrix, user: &str, excluded: &str) -> Result<Prediction>;
}
