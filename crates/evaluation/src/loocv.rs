//! # Leave-one-out cross-validation
//!
//! For every rating in the matrix:
//! 1. Hold the rating out of the matrix
//! 2. Ask the recommender to predict exactly that item
//! 3. Put the rating back
//! 4. Record the error if the prediction is present and non-zero
//!
//! Step 3 is tied to a scope guard, so the caller's matrix is restored on
//! every exit path, including errors and cancellation.

use crate::error::{EvaluationError, Result};
use crate::metrics::{ErrorMetrics, DEFAULT_COVERAGE_DENOMINATOR};
use crate::sink::{ResultSink, TrialRecord};
use data_loader::{ItemTitle, RatingMatrix, UserId};
use recommender::{Recommender, RecommendError};
use serde::{Deserialize, Serialize};
use similarity::{CancellationToken, SimilarityMethod};
use std::ops::Deref;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// A rating temporarily removed from a matrix.
///
/// Derefs to the matrix without the rating; dropping the guard puts the
/// rating back.
pub struct HeldOutRating<'a> {
    ratings: &'a mut RatingMatrix,
    user: &'a str,
    item: &'a str,
    rating: f64,
}

impl<'a> HeldOutRating<'a> {
    /// Remove `user`'s rating of `item`; `None` if there is no such rating
    pub fn hold_out(ratings: &'a mut RatingMatrix, user: &'a str, item: &'a str) -> Option<Self> {
        let rating = ratings.remove(user, item)?;
        Some(Self {
            ratings,
            user,
            item,
            rating,
        })
    }

    /// The rating that was held out
    pub fn rating(&self) -> f64 {
        self.rating
    }
}

impl Deref for HeldOutRating<'_> {
    type Target = RatingMatrix;

    fn deref(&self) -> &RatingMatrix {
        self.ratings
    }
}

impl Drop for HeldOutRating<'_> {
    fn drop(&mut self) {
        self.ratings.insert(self.user, self.item, self.rating);
    }
}

/// Evaluation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Denominator of the coverage fraction
    pub coverage_denominator: usize,
    /// Log progress every this many users
    pub progress_every: usize,
    /// Below this many users, progress is logged for every user
    pub small_dataset_users: usize,
}

impl EvaluationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the coverage denominator (default: 100 000)
    pub fn with_coverage_denominator(mut self, denominator: usize) -> Self {
        self.coverage_denominator = denominator;
        self
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            coverage_denominator: DEFAULT_COVERAGE_DENOMINATOR,
            progress_every: 50,
            small_dataset_users: 20,
        }
    }
}

/// Outcome of one evaluation run
#[derive(Debug, Clone, PartialEq)]
pub struct LoocvReport {
    /// Squared error per successful prediction, in trial order
    pub errors: Vec<f64>,
    /// `(true, predicted)` per successful prediction
    pub pairs: Vec<(f64, f64)>,
    pub metrics: ErrorMetrics,
    pub record: TrialRecord,
    /// Row the record was appended to
    pub row: usize,
}

/// Runs leave-one-out evaluation of a recommender over a rating matrix
#[derive(Debug, Clone, Default)]
pub struct LoocvEvaluator {
    config: EvaluationConfig,
}

impl LoocvEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate `recommender` on every rating of `ratings`.
    ///
    /// `ratings` is mutated one rating at a time and equals its original
    /// value again when this returns, whether it succeeds or fails.
    /// `similarity` names the collaborative method behind the run, if any,
    /// for the trial record.
    #[instrument(skip_all, fields(algorithm = recommender.name()))]
    pub fn evaluate(
        &self,
        ratings: &mut RatingMatrix,
        recommender: &dyn Recommender,
        similarity: Option<SimilarityMethod>,
        sink: &mut dyn ResultSink,
        cancel: &CancellationToken,
    ) -> Result<LoocvReport> {
        if ratings.rating_count() == 0 {
            return Err(EvaluationError::EmptyDataset);
        }

        let start = Instant::now();
        let users: Vec<UserId> = ratings.users().map(str::to_string).collect();
        let total_users = users.len();
        let mut errors = Vec::new();
        let mut pairs = Vec::new();
        let mut trials = 0;

        for (processed, user) in users.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(EvaluationError::Cancelled {
                    processed,
                    total: total_users,
                });
            }

            let items: Vec<ItemTitle> = ratings
                .get_user_ratings(user)
                .map(|r| r.keys().cloned().collect())
                .unwrap_or_default();

            for item in &items {
                let Some(held) = HeldOutRating::hold_out(ratings, user, item) else {
                    continue;
                };
                let truth = held.rating();
                let prediction = recommender.predict(&held, user, item)?;
                drop(held);
                trials += 1;

                if prediction.title != *item {
                    continue;
                }
                if let Some(predicted) = prediction.usable_score() {
                    errors.push((truth - predicted).powi(2));
                    pairs.push((truth, predicted));
                }
            }

            if total_users < self.config.small_dataset_users
                || processed % self.config.progress_every.max(1) == 0
            {
                info!("User {} of {} ({} predictions so far)", processed, total_users, pairs.len());
            }
        }

        let metrics = ErrorMetrics::from_pairs(&pairs, self.config.coverage_denominator);
        let scoring = recommender.config();
        let record = TrialRecord {
            algorithm: recommender.name().to_string(),
            similarity: similarity.map(|method| method.name().to_string()),
            threshold: scoring.similarity_threshold,
            weighted: scoring.weighted,
            mse: metrics.mse,
            rmse: metrics.rmse,
            mae: metrics.mae,
            coverage_fraction: metrics.coverage_fraction,
            coverage: metrics.coverage,
            trials,
        };
        let row = sink.append(&record)?;

        info!(
            "LOOCV {}: MSE {:?}, RMSE {:?}, MAE {:?}, coverage {} ({:.5}) in {:.2?}",
            record.algorithm,
            metrics.mse,
            metrics.rmse,
            metrics.mae,
            metrics.coverage,
            metrics.coverage_fraction,
            start.elapsed()
        );
        debug!("Trial record appended at row {}", row);

        Ok(LoocvReport {
            errors,
            pairs,
            metrics,
            record,
            row,
        })
    }

    /// Evaluate one recommender per threshold, appending one record each.
    ///
    /// `build` constructs the recommender for a threshold.
    pub fn sweep_thresholds<F>(
        &self,
        ratings: &mut RatingMatrix,
        thresholds: &[f64],
        build: F,
        similarity: Option<SimilarityMethod>,
        sink: &mut dyn ResultSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<LoocvReport>>
    where
        F: Fn(f64) -> std::result::Result<Box<dyn Recommender>, RecommendError>,
    {
        thresholds
            .iter()
            .map(|&threshold| {
                info!("Evaluating at similarity threshold {}", threshold);
                let recommender = build(threshold)?;
                self.evaluate(ratings, recommender.as_ref(), similarity, sink, cancel)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_ratings() -> RatingMatrix {
        let mut ratings = RatingMatrix::new();
        ratings.insert("u1", "a", 4.0);
        ratings.insert("u1", "b", 2.0);
        ratings.insert("u2", "a", 5.0);
        ratings
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut ratings = create_test_ratings();
        let before = ratings.clone();
        {
            let held = HeldOutRating::hold_out(&mut ratings, "u1", "a").unwrap();
            assert_eq!(held.rating(), 4.0);
            assert!(!held.contains("u1", "a"));
            assert!(held.contains("u1", "b"));
        }
        assert_eq!(ratings, before);
    }

    #[test]
    fn test_guard_keeps_user_with_last_rating_held_out() {
        let mut ratings = create_test_ratings();
        let before = ratings.clone();
        {
            let held = HeldOutRating::hold_out(&mut ratings, "u2", "a").unwrap();
            assert_eq!(held.get_user_ratings("u2").map(|r| r.len()), Some(0));
        }
        assert_eq!(ratings, before);
    }

    #[test]
    fn test_guard_missing_rating() {
        let mut ratings = create_test_ratings();
        assert!(HeldOutRating::hold_out(&mut ratings, "u2", "b").is_none());
        assert!(HeldOutRating::hold_out(&mut ratings, "nobody", "a").is_none());
        assert_eq!(ratings, create_test_ratings());
    }

    #[test]
    fn test_config_defaults() {
        let config = EvaluationConfig::default();
        assert_eq!(config.coverage_denominator, 100_000);
        assert_eq!(config.progress_every, 50);
        assert_eq!(config.small_dataset_users, 20);
        assert_eq!(
            EvaluationConfig::new().with_coverage_denominator(55).coverage_denominator,
            55
        );
    }
}
