//! Building a recommender from an algorithm choice and precomputed inputs.

use crate::config::ScoringConfig;
use crate::error::{RecommendError, Result};
use crate::feature_encoding::FeatureEncodingRecommender;
use crate::hybrid::HybridRecommender;
use crate::tfidf::TfidfRecommender;
use crate::traits::Recommender;
use crate::types::Algorithm;
use data_loader::{FeatureMatrix, ItemCatalog};
use similarity::{CosineSimilarityMatrix, ItemItemSimilarity};
use std::sync::Arc;

/// Precomputed structures the algorithms draw on.
///
/// Only the ones the chosen algorithm needs have to be present.
#[derive(Debug, Clone, Default)]
pub struct ScoringInputs {
    pub catalog: Arc<ItemCatalog>,
    pub features: Option<Arc<FeatureMatrix>>,
    pub cosine: Option<Arc<CosineSimilarityMatrix>>,
    pub item_similarity: Option<Arc<ItemItemSimilarity>>,
}

impl ScoringInputs {
    pub fn new(catalog: Arc<ItemCatalog>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn with_features(mut self, features: Arc<FeatureMatrix>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn with_cosine(mut self, cosine: Arc<CosineSimilarityMatrix>) -> Self {
        self.cosine = Some(cosine);
        self
    }

    pub fn with_item_similarity(mut self, item_similarity: Arc<ItemItemSimilarity>) -> Self {
        self.item_similarity = Some(item_similarity);
        self
    }
}

fn require<T: Clone>(value: &Option<T>, algorithm: Algorithm, input: &'static str) -> Result<T> {
    value.clone().ok_or(RecommendError::MissingInput {
        algorithm: algorithm.name(),
        input,
    })
}

/// Build the recommender for `algorithm`.
///
/// Fails with `MissingInput` if an input the algorithm needs is absent,
/// or `MatrixMismatch` if it does not line up with the catalog.
pub fn build_recommender(
    algorithm: Algorithm,
    inputs: &ScoringInputs,
    config: ScoringConfig,
) -> Result<Box<dyn Recommender>> {
    let catalog = inputs.catalog.clone();
    Ok(match algorithm {
        Algorithm::FeatureEncoding => Box::new(FeatureEncodingRecommender::new(
            require(&inputs.features, algorithm, "a feature matrix")?,
            catalog,
            config,
        )?),
        Algorithm::Tfidf => Box::new(TfidfRecommender::new(
            require(&inputs.cosine, algorithm, "a cosine similarity matrix")?,
            catalog,
            config,
        )?),
        Algorithm::Hybrid => Box::new(HybridRecommender::new(
            require(&inputs.cosine, algorithm, "a cosine similarity matrix")?,
            require(&inputs.item_similarity, algorithm, "an item-item similarity mapping")?,
            catalog,
            config,
        )?),
    })
}
