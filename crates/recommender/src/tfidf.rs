//! Content-based scoring over the TF-IDF cosine similarity matrix.

use crate::config::ScoringConfig;
use crate::error::{RecommendError, Result};
use crate::neighborhood::{
    catalog_index, neighborhood_score, rank, rated_indices, score_unrated, user_ratings,
};
use crate::traits::Recommender;
use crate::types::{Algorithm, Prediction, Recommendation};
use data_loader::{ItemCatalog, RatingMatrix};
use similarity::CosineSimilarityMatrix;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Predicts a rating as the cosine-weighted average of the user's ratings.
///
/// Neighbours whose cosine similarity to the target is below the
/// configured threshold are ignored.
#[derive(Debug, Clone)]
pub struct TfidfRecommender {
    cosine: Arc<CosineSimilarityMatrix>,
    catalog: Arc<ItemCatalog>,
    config: ScoringConfig,
}

impl TfidfRecommender {
    pub fn new(
        cosine: Arc<CosineSimilarityMatrix>,
        catalog: Arc<ItemCatalog>,
        config: ScoringConfig,
    ) -> Result<Self> {
        check_cosine_shape(&cosine, &catalog)?;
        Ok(Self {
            cosine,
            catalog,
            config,
        })
    }

    fn weight(&self, target: usize, neighbor: usize) -> Option<f64> {
        let similarity = self.cosine.get(target, neighbor);
        (similarity >= self.config.similarity_threshold).then_some(similarity)
    }
}

pub(crate) fn check_cosine_shape(cosine: &CosineSimilarityMatrix, catalog: &ItemCatalog) -> Result<()> {
    if cosine.len() != catalog.len() {
        return Err(RecommendError::MatrixMismatch {
            matrix: "cosine similarity matrix",
            expected: catalog.len(),
            found: cosine.len(),
        });
    }
    Ok(())
}

impl Recommender for TfidfRecommender {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Tfidf
    }

    fn config(&self) -> &ScoringConfig {
        &self.config
    }

    #[instrument(skip(self, ratings), fields(threshold = self.config.similarity_threshold))]
    fn recommend(&self, ratings: &RatingMatrix, user: &str) -> Result<Vec<Recommendation>> {
        let rated = rated_indices(&self.catalog, user_ratings(ratings, user)?)?;
        let recommendations = score_unrated(&self.catalog, &rated, |i, j| self.weight(i, j));
        debug!("Scored {} unrated items", recommendations.len());
        Ok(rank(recommendations, self.config.limit))
    }

    fn predict(&self, ratings: &RatingMatrix, user: &str, excluded: &str) -> Result<Prediction> {
        let rated = rated_indices(&self.catalog, user_ratings(ratings, user)?)?;
        let target = catalog_index(&self.catalog, excluded)?;
        let score = neighborhood_score(&rated, target, |j| self.weight(target, j));
        Ok(Prediction::new(score, excluded))
    }
}
