//! Feature-encoding recommender.
//!
//! ## Algorithm
//! 1. Build a preference accumulator: the feature row of every item the
//!    user rated, scaled by the rating. Unrated rows contribute nothing.
//! 2. Per-feature column sums and the overall sum give a feature
//!    importance vector `col_sums / overall_sum`.
//! 3. For an unrated item, its binary row times the importance vector is
//!    normalised to sum 1. Each feature's average rating
//!    (`col_sums / nonzero_count`) is masked by the item's row and
//!    combined with those weights.
//!
//! A user whose ratings touch no feature at all gets no recommendations.

use crate::config::{ScoringConfig, FEATURE_ENCODING_TRUNCATE_ABOVE};
use crate::error::{RecommendError, Result};
use crate::neighborhood::{catalog_index, rated_indices, sum_defined, user_ratings};
use crate::traits::Recommender;
use crate::types::{Algorithm, Prediction, Recommendation};
use data_loader::{FeatureMatrix, ItemCatalog, RatingMatrix, UserRatings};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Per-user feature statistics derived from the preference accumulator
#[derive(Debug, Clone, PartialEq)]
struct FeatureProfile {
    col_sums: Vec<f64>,
    /// Rated items with a non-zero accumulated value, per feature
    nonzero: Vec<usize>,
    importance: Vec<f64>,
}

impl FeatureProfile {
    /// Average rating of a feature; absent if no rated item carries it
    fn average(&self, feature: usize) -> Option<f64> {
        let count = self.nonzero[feature];
        (count > 0).then(|| self.col_sums[feature] / count as f64)
    }

    /// Predicted score for an item with binary feature `row`
    fn score(&self, row: &[u8]) -> Option<f64> {
        let weights: Vec<f64> = row
            .iter()
            .zip(&self.importance)
            .map(|(&bit, &importance)| f64::from(bit) * importance)
            .collect();
        let weight_sum: f64 = weights.iter().sum();
        if weight_sum == 0.0 {
            return None;
        }

        let score = sum_defined(row.iter().enumerate().map(|(feature, &bit)| {
            self.average(feature)
                .map(|average| average * f64::from(bit) * (weights[feature] / weight_sum))
        }));
        score.is_finite().then_some(score)
    }
}

/// Scores unrated items by how well their features match the features of
/// the items the user rated.
#[derive(Debug, Clone)]
pub struct FeatureEncodingRecommender {
    features: Arc<FeatureMatrix>,
    catalog: Arc<ItemCatalog>,
    config: ScoringConfig,
}

impl FeatureEncodingRecommender {
    pub fn new(
        features: Arc<FeatureMatrix>,
        catalog: Arc<ItemCatalog>,
        config: ScoringConfig,
    ) -> Result<Self> {
        if features.len() != catalog.len() {
            return Err(RecommendError::MatrixMismatch {
                matrix: "feature matrix",
                expected: catalog.len(),
                found: features.len(),
            });
        }
        Ok(Self {
            features,
            catalog,
            config,
        })
    }

    fn row(&self, index: usize) -> &[u8] {
        self.features.row(index).unwrap_or(&[])
    }

    /// `None` when the user's ratings carry no feature weight
    fn profile(&self, ratings: &UserRatings) -> Result<Option<FeatureProfile>> {
        let width = self.features.width();
        let mut col_sums = vec![0.0; width];
        let mut nonzero = vec![0usize; width];

        for (index, rating) in rated_indices(&self.catalog, ratings)? {
            for (feature, &bit) in self.row(index).iter().enumerate() {
                let value = f64::from(bit) * rating;
                col_sums[feature] += value;
                if value != 0.0 {
                    nonzero[feature] += 1;
                }
            }
        }

        let overall_sum: f64 = col_sums.iter().sum();
        if overall_sum == 0.0 {
            return Ok(None);
        }
        let importance = col_sums.iter().map(|sum| sum / overall_sum).collect();

        Ok(Some(FeatureProfile {
            col_sums,
            nonzero,
            importance,
        }))
    }
}

impl Recommender for FeatureEncodingRecommender {
    fn algorithm(&self) -> Algorithm {
        Algorithm::FeatureEncoding
    }

    fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Lists longer than ten entries are cut to the configured limit;
    /// shorter ones are returned whole.
    #[instrument(skip(self, ratings))]
    fn recommend(&self, ratings: &RatingMatrix, user: &str) -> Result<Vec<Recommendation>> {
        let user_ratings = user_ratings(ratings, user)?;
        let Some(profile) = self.profile(user_ratings)? else {
            debug!("No feature-relevant ratings for user {}", user);
            return Ok(Vec::new());
        };

        let mut recommendations: Vec<Recommendation> = self
            .catalog
            .iter()
            .filter(|(_, title)| !user_ratings.contains_key(*title))
            .filter_map(|(id, title)| {
                let score = profile.score(self.row(id as usize - 1))?;
                Some(Recommendation::new(score, title))
            })
            .collect();

        recommendations.sort_by(Recommendation::ranking_cmp);
        if recommendations.len() > FEATURE_ENCODING_TRUNCATE_ABOVE {
            recommendations.truncate(self.config.limit);
        }
        Ok(recommendations)
    }

    fn predict(&self, ratings: &RatingMatrix, user: &str, excluded: &str) -> Result<Prediction> {
        let user_ratings = user_ratings(ratings, user)?;
        let target = catalog_index(&self.catalog, excluded)?;
        let score = self
            .profile(user_ratings)?
            .and_then(|profile| profile.score(self.row(target)));
        Ok(Prediction::new(score, excluded))
    }
}
