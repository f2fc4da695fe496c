//! Values produced by the recommenders.

use crate::error::RecommendError;
use data_loader::ItemTitle;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A predicted rating for an item the user has not rated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub score: f64,
    pub title: ItemTitle,
}

impl Recommendation {
    pub fn new(score: f64, title: impl Into<ItemTitle>) -> Self {
        Self {
            score,
            title: title.into(),
        }
    }

    /// Ranking order: score descending, then title descending
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.title.cmp(&self.title))
    }
}

/// Prediction for one held-out item; `score` is `None` when the
/// algorithm had nothing to base a prediction on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub score: Option<f64>,
    pub title: ItemTitle,
}

impl Prediction {
    pub fn new(score: Option<f64>, title: impl Into<ItemTitle>) -> Self {
        Self {
            score,
            title: title.into(),
        }
    }

    pub fn none(title: impl Into<ItemTitle>) -> Self {
        Self::new(None, title)
    }

    /// Present and non-zero: the only predictions that count towards
    /// evaluation metrics.
    pub fn usable_score(&self) -> Option<f64> {
        self.score.filter(|&score| score != 0.0)
    }
}

/// The three scoring algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    FeatureEncoding,
    Tfidf,
    Hybrid,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::FeatureEncoding, Algorithm::Tfidf, Algorithm::Hybrid];

    /// Name written to trial records
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::FeatureEncoding => "FE",
            Algorithm::Tfidf => "TFIDF",
            Algorithm::Hybrid => "HBR",
        }
    }

    /// Whether scoring needs the cosine similarity matrix
    pub fn needs_cosine(&self) -> bool {
        !matches!(self, Algorithm::FeatureEncoding)
    }

    /// Whether scoring needs the item-item similarity mapping
    pub fn needs_item_similarity(&self) -> bool {
        matches!(self, Algorithm::Hybrid)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fe" | "feature-encoding" => Ok(Algorithm::FeatureEncoding),
            "tfidf" | "tf-idf" => Ok(Algorithm::Tfidf),
            "hbr" | "hybrid" => Ok(Algorithm::Hybrid),
            _ => Err(RecommendError::UnknownAlgorithm(s.to_string())),
        }
    }
}
