//! # Recommender Crate
//!
//! The three scoring algorithms of the harness, each with a full-catalog
//! `recommend` and a single-item `predict` used by leave-one-out
//! evaluation.
//!
//! ## Algorithms
//! - **feature_encoding**: genre-importance weighting of unrated items
//! - **tfidf**: weighted average of the user's ratings by TF-IDF cosine
//!   similarity
//! - **hybrid**: TF-IDF with zero cosine cells filled from collaborative
//!   item-item similarity
//!
//! ## Example Usage
//! ```ignore
//! use recommender::{build_recommender, Algorithm, ScoringConfig, ScoringInputs};
//!
//! let inputs = ScoringInputs::new(catalog)
//!     .with_cosine(cosine)
//!     .with_item_similarity(item_similarity);
//! let config = ScoringConfig::new().with_threshold(0.3).with_weighted(true);
//!
//! let hybrid = build_recommender(Algorithm::Hybrid, &inputs, config)?;
//! let recs = hybrid.recommend(&dataset.ratings, "340")?;
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod feature_encoding;
pub mod hybrid;
pub mod neighborhood;
pub mod tfidf;
pub mod traits;
pub mod types;

pub use config::{
    ScoringConfig, DEFAULT_HYBRID_WEIGHTING, DEFAULT_LIMIT, DEFAULT_SIMILARITY_THRESHOLDS,
};
pub use error::{RecommendError, Result};
pub use factory::{build_recommender, ScoringInputs};
pub use feature_encoding::FeatureEncodingRecommender;
pub use hybrid::{blend_weight, HybridRecommender};
pub use neighborhood::{neighborhood_score, sum_defined, WeightedAverage};
pub use tfidf::TfidfRecommender;
pub use traits::Recommender;
pub use types::{Algorithm, Prediction, Recommendation};
