//! Shared neighbourhood scoring.
//!
//! TF-IDF and hybrid scoring both predict an item as the weighted average
//! of the user's ratings on other items, weighted by item similarity. The
//! helpers here own that loop; the scorers only supply the weight of each
//! (target, neighbour) pair.

use crate::error::{RecommendError, Result};
use crate::types::Recommendation;
use data_loader::{ItemCatalog, ItemId, RatingMatrix, UserRatings};
use rayon::prelude::*;

/// Sum of the defined terms; absent terms are skipped.
pub fn sum_defined<I>(terms: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    terms.into_iter().flatten().sum()
}

/// Running `Σ rating·weight / Σ weight`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedAverage {
    numerator: f64,
    denominator: f64,
}

impl WeightedAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rating: f64, weight: f64) {
        self.numerator += rating * weight;
        self.denominator += weight;
    }

    /// The average, only if numerator and denominator are both positive
    pub fn value(&self) -> Option<f64> {
        (self.numerator > 0.0 && self.denominator > 0.0)
            .then(|| self.numerator / self.denominator)
    }
}

pub(crate) fn user_ratings<'a>(ratings: &'a RatingMatrix, user: &str) -> Result<&'a UserRatings> {
    ratings
        .get_user_ratings(user)
        .ok_or_else(|| RecommendError::UnknownUser {
            user: user.to_string(),
        })
}

pub(crate) fn catalog_index(catalog: &ItemCatalog, title: &str) -> Result<usize> {
    catalog
        .index_of(title)
        .ok_or_else(|| RecommendError::UnknownItem {
            title: title.to_string(),
        })
}

/// The user's ratings keyed by zero-based catalog index, in index order
pub(crate) fn rated_indices(catalog: &ItemCatalog, ratings: &UserRatings) -> Result<Vec<(usize, f64)>> {
    let mut rated = ratings
        .iter()
        .map(|(title, &rating)| Ok((catalog_index(catalog, title)?, rating)))
        .collect::<Result<Vec<_>>>()?;
    rated.sort_by_key(|&(index, _)| index);
    Ok(rated)
}

/// Weighted average of the user's ratings for `target`.
///
/// `weight(j)` returns the similarity of neighbour `j` to the target, or
/// `None` to skip the pair. The target itself is never its own neighbour.
pub fn neighborhood_score<F>(rated: &[(usize, f64)], target: usize, weight: F) -> Option<f64>
where
    F: Fn(usize) -> Option<f64>,
{
    let mut average = WeightedAverage::new();
    for &(neighbor, rating) in rated {
        if neighbor == target {
            continue;
        }
        if let Some(w) = weight(neighbor) {
            average.add(rating, w);
        }
    }
    average.value()
}

/// Score every catalog item the user has not rated, in parallel.
///
/// `weight(i, j)` is the pair weight for target `i` and neighbour `j`.
pub(crate) fn score_unrated<F>(
    catalog: &ItemCatalog,
    rated: &[(usize, f64)],
    weight: F,
) -> Vec<Recommendation>
where
    F: Fn(usize, usize) -> Option<f64> + Sync,
{
    (0..catalog.len())
        .into_par_iter()
        .filter(|target| rated.binary_search_by_key(target, |&(index, _)| index).is_err())
        .filter_map(|target| {
            let score = neighborhood_score(rated, target, |neighbor| weight(target, neighbor))?;
            let title = catalog.title(target as ItemId + 1)?;
            Some(Recommendation::new(score, title))
        })
        .collect()
}

/// Sort by ranking order and keep the first `limit`
pub(crate) fn rank(mut recommendations: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    recommendations.sort_by(Recommendation::ranking_cmp);
    recommendations.truncate(limit);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_defined_skips_absent() {
        assert_eq!(sum_defined([Some(1.5), None, Some(2.0)]), 3.5);
        assert_eq!(sum_defined(std::iter::empty()), 0.0);
        assert_eq!(sum_defined([None, None]), 0.0);
    }

    #[test]
    fn test_weighted_average() {
        let mut average = WeightedAverage::new();
        assert_eq!(average.value(), None);

        average.add(4.0, 0.5);
        average.add(2.0, 0.5);
        assert_eq!(average.value(), Some(3.0));
    }

    #[test]
    fn test_weighted_average_zero_weights() {
        let mut average = WeightedAverage::new();
        average.add(4.0, 0.0);
        assert_eq!(average.value(), None);
    }

    #[test]
    fn test_neighborhood_score_skips_target() {
        let rated = vec![(0, 5.0), (1, 1.0), (2, 3.0)];
        let score = neighborhood_score(&rated, 1, |_| Some(1.0));
        assert_eq!(score, Some(4.0));

        let none = neighborhood_score(&rated, 1, |_| None);
        assert_eq!(none, None);
    }

    #[test]
    fn test_rank_truncates() {
        let recs = (0..20)
            .map(|i| Recommendation::new(i as f64, format!("item{i:02}")))
            .collect();
        let ranked = rank(recs, 15);
        assert_eq!(ranked.len(), 15);
        assert_eq!(ranked[0].title, "item19");
    }

    #[test]
    fn test_rated_indices_unknown_title() {
        let catalog = ItemCatalog::from_titles(["a", "b"]).unwrap();
        let mut ratings = UserRatings::new();
        ratings.insert("b".to_string(), 4.0);
        ratings.insert("a".to_string(), 2.0);
        assert_eq!(rated_indices(&catalog, &ratings).unwrap(), vec![(0, 2.0), (1, 4.0)]);

        ratings.insert("zzz".to_string(), 1.0);
        assert!(matches!(
            rated_indices(&catalog, &ratings),
            Err(RecommendError::UnknownItem { .. })
        ));
    }
}
