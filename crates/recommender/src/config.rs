//! Scoring configuration shared by the recommenders.

use serde::{Deserialize, Serialize};

/// Similarity thresholds swept by the evaluation harness
pub const DEFAULT_SIMILARITY_THRESHOLDS: [f64; 4] = [0.0, 0.3, 0.5, 0.7];

/// Scale applied to substituted item-item similarities
pub const DEFAULT_HYBRID_WEIGHTING: f64 = 0.75;

/// Number of recommendations returned by default
pub const DEFAULT_LIMIT: usize = 15;

/// The feature-encoding recommender only truncates lists longer than this
pub const FEATURE_ENCODING_TRUNCATE_ABOVE: usize = 10;

/// Knobs for one scoring run.
///
/// Passed explicitly to every recommender; nothing here is process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Neighbours with a cosine similarity below this are ignored
    pub similarity_threshold: f64,
    /// Scale applied to substituted item-item values when `weighted` is set
    pub hybrid_weighting: f64,
    /// Apply `hybrid_weighting` to substituted values
    pub weighted: bool,
    /// Maximum number of recommendations
    pub limit: usize,
}

impl ScoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the similarity threshold (default: 0.0)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Configure the hybrid weighting factor (default: 0.75)
    pub fn with_hybrid_weighting(mut self, weighting: f64) -> Self {
        self.hybrid_weighting = weighting;
        self
    }

    /// Enable or disable hybrid weighting (default: disabled)
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    /// Configure the result limit (default: 15)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.0,
            hybrid_weighting: DEFAULT_HYBRID_WEIGHTING,
            weighted: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.similarity_threshold, 0.0);
        assert_eq!(config.hybrid_weighting, 0.75);
        assert!(!config.weighted);
        assert_eq!(config.limit, 15);
    }

    #[test]
    fn test_builder() {
        let config = ScoringConfig::new()
            .with_threshold(0.3)
            .with_weighted(true)
            .with_hybrid_weighting(0.5)
            .with_limit(5);
        assert_eq!(config.similarity_threshold, 0.3);
        assert!(config.weighted);
        assert_eq!(config.hybrid_weighting, 0.5);
        assert_eq!(config.limit, 5);
    }
}
