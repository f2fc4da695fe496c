//! Error types for the data-loader crate.
//!
//! Every structural problem found while reading or validating a dataset
//! maps onto one variant here, carrying enough context to point at the
//! offending file, line or key.

use thiserror::Error;

/// Errors that can occur during dataset loading, parsing and validation
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Referenced entity doesn't exist (e.g., rating for an item missing from the catalog)
    #[error("Missing reference: {entity} with key {key}")]
    MissingReference { entity: String, key: String },

    /// The same title was registered under two item ids
    #[error("Duplicate item title {title:?} (ids {first} and {second})")]
    DuplicateTitle {
        title: String,
        first: u32,
        second: u32,
    },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
