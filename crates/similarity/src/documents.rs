//! Item "documents" for the TF-IDF vector space.
//!
//! An item's document is the space-joined list of the genre names whose
//! flag is set in its feature row, in column order.

use data_loader::{FeatureMatrix, GenreIndex};

/// Build the document for one feature row.
///
/// An all-zero row yields an empty document.
pub fn build_document(row: &[u8], genres: &GenreIndex) -> String {
    row.iter()
        .enumerate()
        .filter(|&(_, &flag)| flag == 1)
        .filter_map(|(column, _)| genres.name(column))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build one document per item, in item order
pub fn build_documents(features: &FeatureMatrix, genres: &GenreIndex) -> Vec<String> {
    features
        .rows()
        .iter()
        .map(|row| build_document(row, genres))
        .collect()
}
