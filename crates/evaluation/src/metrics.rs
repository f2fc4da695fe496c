//! Error metrics over (true, predicted) rating pairs.

use serde::{Deserialize, Serialize};

/// Coverage denominator matching the size of MovieLens 100K
pub const DEFAULT_COVERAGE_DENOMINATOR: usize = 100_000;

/// Accuracy and coverage of one evaluation run.
///
/// The error metrics are `None` when no prediction was made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub mse: Option<f64>,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    /// Number of predictions made
    pub coverage: usize,
    /// `coverage / denominator`
    pub coverage_fraction: f64,
}

impl ErrorMetrics {
    /// Compute metrics from `(true, predicted)` pairs
    pub fn from_pairs(pairs: &[(f64, f64)], coverage_denominator: usize) -> Self {
        let coverage = pairs.len();
        let coverage_fraction = if coverage_denominator == 0 {
            0.0
        } else {
            coverage as f64 / coverage_denominator as f64
        };

        if pairs.is_empty() {
            return Self {
                mse: None,
                rmse: None,
                mae: None,
                coverage,
                coverage_fraction,
            };
        }

        let n = coverage as f64;
        let mse = pairs.iter().map(|(t, p)| (t - p).powi(2)).sum::<f64>() / n;
        let mae = pairs.iter().map(|(t, p)| (t - p).abs()).sum::<f64>() / n;

        Self {
            mse: Some(mse),
            rmse: Some(mse.sqrt()),
            mae: Some(mae),
            coverage,
            coverage_fraction,
        }
    }
}
