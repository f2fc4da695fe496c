//! Error types for the recommender crate.
//!
//! Per-item anomalies (zero denominators, missing item-item similarity,
//! users with no feature-relevant ratings) are not errors; they simply
//! produce no recommendation. Only structural problems end up here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// The user has no entry in the rating matrix
    #[error("Unknown user: {user}")]
    UnknownUser { user: String },

    /// A rated or excluded title has no id in the item catalog
    #[error("Item {title:?} is missing from the item catalog")]
    UnknownItem { title: String },

    /// A similarity or feature matrix does not line up with the catalog
    #[error("{matrix} has {found} rows but the catalog has {expected} items")]
    MatrixMismatch {
        matrix: &'static str,
        expected: usize,
        found: usize,
    },

    /// The algorithm was requested without one of its inputs
    #[error("{algorithm} recommender requires {input}")]
    MissingInput {
        algorithm: &'static str,
        input: &'static str,
    },

    /// An algorithm name did not parse
    #[error("Unknown algorithm {0:?} (expected fe, tfidf or hybrid)")]
    UnknownAlgorithm(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
