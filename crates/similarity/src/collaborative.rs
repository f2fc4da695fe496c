//! Collaborative similarity between rating vectors.
//!
//! ## Algorithm
//! 1. Two anchors (users, or items on the transposed matrix) are compared
//!    over the keys both have rated
//! 2. Euclidean-derived or Pearson similarity is computed on those pairs
//! 3. Significance weighting scales down similarities built from fewer than
//!    `k` shared ratings by `shared / k`
//! 4. `top_matches` ranks every other anchor against one anchor
//! 5. `calculate_similar_items` runs `top_matches` for every item of the
//!    transposed matrix to build the item-item similarity mapping

use crate::cancel::CancellationToken;
use crate::error::{Result, SimilarityError};
use data_loader::{ItemTitle, RatingMatrix, UserRatings};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, instrument};

/// Default number of neighbours kept per anchor
pub const DEFAULT_NEIGHBORS: usize = 100;

/// Default significance weighting factor for item-item similarity
pub const DEFAULT_SIGNIFICANCE_WEIGHTING: usize = 25;

/// Which similarity function to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityMethod {
    /// `1 / (1 + euclidean distance)`
    Euclidean,
    /// Pearson correlation
    Pearson,
}

impl SimilarityMethod {
    /// Name used in result records and store keys
    pub fn name(&self) -> &'static str {
        match self {
            SimilarityMethod::Euclidean => "sim_distance",
            SimilarityMethod::Pearson => "sim_pearson",
        }
    }

    /// Similarity between two anchors of `prefs`
    pub fn similarity(&self, prefs: &RatingMatrix, a: &str, b: &str, weighting: usize) -> f64 {
        match self {
            SimilarityMethod::Euclidean => sim_distance(prefs, a, b, weighting),
            SimilarityMethod::Pearson => sim_pearson(prefs, a, b, weighting),
        }
    }
}

impl std::fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of the item-item similarity computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeConfig {
    pub method: SimilarityMethod,
    /// Significance weighting factor `k`; 0 disables weighting
    pub significance_weighting: usize,
    /// Neighbours kept per item
    pub neighbors: usize,
    /// Drop neighbours scoring below this value; `None` keeps them all
    pub threshold: Option<f64>,
}

impl CollaborativeConfig {
    pub fn new(method: SimilarityMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Configure the significance weighting factor (default: 25)
    pub fn with_significance_weighting(mut self, weighting: usize) -> Self {
        self.significance_weighting = weighting;
        self
    }

    /// Configure neighbours kept per item (default: 100)
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Configure the minimum neighbour score (default: keep all)
    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            method: SimilarityMethod::Pearson,
            significance_weighting: DEFAULT_SIGNIFICANCE_WEIGHTING,
            neighbors: DEFAULT_NEIGHBORS,
            threshold: None,
        }
    }
}

/// Neighbours of one anchor: other anchor -> similarity
pub type Neighbors = HashMap<ItemTitle, f64>;

/// Item title -> item title -> similarity.
///
/// Built independently per anchor item with top-N truncation, so
/// `get(a, b)` and `get(b, a)` may differ or be missing on one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemItemSimilarity {
    items: HashMap<ItemTitle, Neighbors>,
}

impl ItemItemSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the neighbour list of an item
    pub fn insert(&mut self, item: impl Into<ItemTitle>, neighbors: Neighbors) {
        self.items.insert(item.into(), neighbors);
    }

    /// Similarity of `other` in `item`'s neighbour list
    pub fn get(&self, item: &str, other: &str) -> Option<f64> {
        self.items.get(item)?.get(other).copied()
    }

    pub fn neighbors(&self, item: &str) -> Option<&Neighbors> {
        self.items.get(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemTitle, &Neighbors)> {
        self.items.iter()
    }

    /// Number of anchor items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(ItemTitle, Neighbors)> for ItemItemSimilarity {
    fn from_iter<T: IntoIterator<Item = (ItemTitle, Neighbors)>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Pairs of ratings on the keys both maps contain, in `a`'s key order
fn shared_ratings(a: &UserRatings, b: &UserRatings) -> Vec<(f64, f64)> {
    a.iter()
        .filter_map(|(item, &ra)| b.get(item).map(|&rb| (ra, rb)))
        .collect()
}

/// Scale `similarity` by `shared / k` when fewer than `k` ratings are shared
fn apply_significance(similarity: f64, shared: usize, weighting: usize) -> f64 {
    if weighting != 0 && shared < weighting {
        similarity * (shared as f64 / weighting as f64)
    } else {
        similarity
    }
}

/// Euclidean distance similarity: `1 / (1 + sqrt(sum of squared differences))`
///
/// Returns 0 when either anchor is unknown or nothing is shared.
pub fn sim_distance(prefs: &RatingMatrix, p1: &str, p2: &str, weighting: usize) -> f64 {
    let (Some(a), Some(b)) = (prefs.get_user_ratings(p1), prefs.get_user_ratings(p2)) else {
        return 0.0;
    };
    let shared = shared_ratings(a, b);
    if shared.is_empty() {
        return 0.0;
    }

    let sum_of_squares: f64 = shared.iter().map(|(x, y)| (x - y).powi(2)).sum();
    let distance_sim = 1.0 / (1.0 + sum_of_squares.sqrt());

    apply_significance(distance_sim, shared.len(), weighting)
}

/// Pearson correlation over the shared ratings
///
/// Returns 0 when either anchor is unknown, nothing is shared, or either
/// side has zero variance on the shared keys.
pub fn sim_pearson(prefs: &RatingMatrix, p1: &str, p2: &str, weighting: usize) -> f64 {
    let (Some(a), Some(b)) = (prefs.get_user_ratings(p1), prefs.get_user_ratings(p2)) else {
        return 0.0;
    };
    let shared = shared_ratings(a, b);
    if shared.is_empty() {
        return 0.0;
    }

    let count = shared.len() as f64;
    let x_avg = shared.iter().map(|(x, _)| x).sum::<f64>() / count;
    let y_avg = shared.iter().map(|(_, y)| y).sum::<f64>() / count;

    let numerator: f64 = shared
        .iter()
        .map(|(x, y)| (x - x_avg) * (y - y_avg))
        .sum();
    let denominator = shared.iter().map(|(x, _)| (x - x_avg).powi(2)).sum::<f64>().sqrt()
        * shared.iter().map(|(_, y)| (y - y_avg).powi(2)).sum::<f64>().sqrt();

    if denominator == 0.0 {
        return 0.0;
    }
    apply_significance(numerator / denominator, shared.len(), weighting)
}

/// Best matches for `anchor` among the other anchors of `prefs`.
///
/// Scores are sorted descending with a stable sort, so ties keep the
/// matrix's key order; the top `n` are kept, then any below `threshold`
/// are dropped.
pub fn top_matches(
    prefs: &RatingMatrix,
    anchor: &str,
    n: usize,
    method: SimilarityMethod,
    weighting: usize,
    threshold: Option<f64>,
) -> Neighbors {
    let mut scores: Vec<(&str, f64)> = prefs
        .users()
        .filter(|&other| other != anchor)
        .map(|other| (other, method.similarity(prefs, anchor, other, weighting)))
        .collect();

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    scores.truncate(n);

    scores
        .into_iter()
        .filter(|&(_, score)| threshold.is_none_or(|t| score >= t))
        .map(|(other, score)| (other.to_string(), score))
        .collect()
}

/// Build the item-item similarity mapping from a user-item rating matrix.
///
/// The matrix is transposed and `top_matches` runs once per item, in
/// parallel. Progress is logged every 100 items; the cancellation token
/// is checked before each item.
#[instrument(skip(ratings, cancel), fields(method = %config.method))]
pub fn calculate_similar_items(
    ratings: &RatingMatrix,
    config: &CollaborativeConfig,
    cancel: &CancellationToken,
) -> Result<ItemItemSimilarity> {
    if ratings.is_empty() {
        return Err(SimilarityError::EmptyRatings);
    }

    let item_prefs = ratings.transpose();
    let items: Vec<&str> = item_prefs.users().collect();
    let total = items.len();
    let processed = AtomicUsize::new(0);
    info!("Computing item-item similarity for {} items", total);

    let rows = items
        .par_iter()
        .map(|&item| {
            if cancel.is_cancelled() {
                return Err(SimilarityError::Cancelled {
                    processed: processed.load(Ordering::Relaxed),
                    total,
                });
            }

            let neighbors = top_matches(
                &item_prefs,
                item,
                config.neighbors,
                config.method,
                config.significance_weighting,
                config.threshold,
            );

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 100 == 0 {
                info!("{}% complete ({}/{})", 100 * done / total, done, total);
            }
            Ok((item.to_string(), neighbors))
        })
        .collect::<Result<Vec<(ItemTitle, Neighbors)>>>()?;

    let result: ItemItemSimilarity = rows.into_iter().collect();
    debug!("Item-item similarity covers {} items", result.len());
    Ok(result)
}
