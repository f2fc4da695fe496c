//! Hybrid scoring: TF-IDF cosine similarity with collaborative fill-in.
//!
//! Content similarity is zero for any pair of items sharing no genre. For
//! those pairs the collaborative item-item similarity is used instead,
//! optionally scaled down by the hybrid weighting.
//!
//! The substitution is computed per pair on every call. The shared cosine
//! matrix is never written; `blended_matrix` builds a private copy when
//! the filled-in matrix itself is wanted.

use crate::config::ScoringConfig;
use crate::error::{RecommendError, Result};
use crate::neighborhood::{
    catalog_index, neighborhood_score, rank, rated_indices, score_unrated, user_ratings,
};
use crate::tfidf::check_cosine_shape;
use crate::traits::Recommender;
use crate::types::{Algorithm, Prediction, Recommendation};
use data_loader::{ItemCatalog, ItemId, RatingMatrix};
use rayon::prelude::*;
use similarity::{CosineSimilarityMatrix, ItemItemSimilarity};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Weight of one (target, neighbour) pair under hybrid scoring.
///
/// * below the threshold: skipped
/// * cosine exactly 0: the item-item similarity, if present and positive,
///   times the hybrid weighting when `weighted` is set; otherwise skipped
/// * anything else: the cosine similarity
///
/// Only exact zeros are substituted; small positive cosine values below
/// the threshold never reach the fill-in.
pub fn blend_weight<F>(cosine: f64, item_similarity: F, config: &ScoringConfig) -> Option<f64>
where
    F: FnOnce() -> Option<f64>,
{
    if cosine < config.similarity_threshold {
        return None;
    }
    if cosine != 0.0 {
        return Some(cosine);
    }

    let substitute = item_similarity().filter(|&value| value > 0.0)?;
    Some(if config.weighted {
        substitute * config.hybrid_weighting
    } else {
        substitute
    })
}

/// TF-IDF recommender whose zero cosine cells fall back to collaborative
/// item-item similarity.
#[derive(Debug, Clone)]
pub struct HybridRecommender {
    cosine: Arc<CosineSimilarityMatrix>,
    item_similarity: Arc<ItemItemSimilarity>,
    catalog: Arc<ItemCatalog>,
    config: ScoringConfig,
}

impl HybridRecommender {
    pub fn new(
        cosine: Arc<CosineSimilarityMatrix>,
        item_similarity: Arc<ItemItemSimilarity>,
        catalog: Arc<ItemCatalog>,
        config: ScoringConfig,
    ) -> Result<Self> {
        check_cosine_shape(&cosine, &catalog)?;
        Ok(Self {
            cosine,
            item_similarity,
            catalog,
            config,
        })
    }

    fn title(&self, index: usize) -> Option<&str> {
        self.catalog.title(index as ItemId + 1)
    }

    fn lookup(&self, target: usize, neighbor: usize) -> Option<f64> {
        self.item_similarity
            .get(self.title(target)?, self.title(neighbor)?)
    }

    fn weight(&self, target: usize, neighbor: usize) -> Option<f64> {
        blend_weight(
            self.cosine.get(target, neighbor),
            || self.lookup(target, neighbor),
            &self.config,
        )
    }

    /// A copy of the cosine matrix with every off-diagonal zero cell
    /// replaced by its (weighted) positive item-item similarity.
    ///
    /// The threshold is not applied; cells without a usable substitute
    /// stay zero.
    pub fn blended_matrix(&self) -> Result<CosineSimilarityMatrix> {
        let size = self.cosine.len();
        let values: Vec<f64> = (0..size)
            .into_par_iter()
            .flat_map_iter(|i| {
                self.cosine.row(i).iter().enumerate().map(move |(j, &value)| {
                    if i == j || value != 0.0 {
                        return value;
                    }
                    self.lookup(i, j)
                        .filter(|&substitute| substitute > 0.0)
                        .map(|substitute| {
                            if self.config.weighted {
                                substitute * self.config.hybrid_weighting
                            } else {
                                substitute
                            }
                        })
                        .unwrap_or(0.0)
                })
            })
            .collect();

        CosineSimilarityMatrix::from_raw(size, values).ok_or(RecommendError::MatrixMismatch {
            matrix: "blended similarity matrix",
            expected: size,
            found: size,
        })
    }
}

impl Recommender for HybridRecommender {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Hybrid
    }

    fn config(&self) -> &ScoringConfig {
        &self.config
    }

    #[instrument(skip(self, ratings), fields(threshold = self.config.similarity_threshold, weighted = self.config.weighted))]
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
