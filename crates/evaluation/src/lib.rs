//! # Evaluation Crate
//!
//! Leave-one-out cross-validation of the recommenders.
//!
//! ## Components
//! - **loocv**: the hold-out / predict / restore loop and threshold sweeps
//! - **metrics**: MSE, RMSE, MAE and coverage
//! - **sink**: trial records and where they are appended
//!
//! ## Example Usage
//! ```ignore
//! use evaluation::{EvaluationConfig, JsonLinesSink, LoocvEvaluator};
//!
//! let evaluator = LoocvEvaluator::new(EvaluationConfig::default());
//! let mut sink = JsonLinesSink::open("results/loocv.jsonl")?;
//! let report = evaluator.evaluate(
//!     &mut dataset.ratings,
//!     recommender.as_ref(),
//!     Some(SimilarityMethod::Pearson),
//!     &mut sink,
//!     &CancellationToken::new(),
//! )?;
//! println!("RMSE {:?}", report.metrics.rmse);
//! ```

pub mod error;
pub mod loocv;
pub mod metrics;
pub mod sink;

pub use error::{EvaluationError, Result};
pub use loocv::{EvaluationConfig, HeldOutRating, LoocvEvaluator, LoocvReport};
pub use metrics::{ErrorMetrics, DEFAULT_COVERAGE_DENOMINATOR};
pub use sink::{JsonLinesSink, MemorySink, ResultSink, TrialRecord};
