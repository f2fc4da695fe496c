//! Core domain types for rating datasets.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - `RatingMatrix`: user -> item title -> rating
//! - `ItemCatalog`: the bijection between 1-based item ids and titles
//! - `FeatureMatrix`: one binary genre row per item
//! - `GenreIndex`: column index -> genre name
//! - `Dataset`: the four of them loaded together

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a user as it appears in the ratings file
pub type UserId = String;

/// Item title, the key used inside a `RatingMatrix`
pub type ItemTitle = String;

/// 1-based item identifier (row `id - 1` of the feature matrix)
pub type ItemId = u32;

/// Ratings given by one user, keyed by item title
pub type UserRatings = BTreeMap<ItemTitle, f64>;

// =============================================================================
// RatingMatrix
// =============================================================================

/// Sparse two-level rating matrix: user id -> item title -> rating.
///
/// Absence of an entry means "not rated", never zero. Both levels are
/// ordered maps so every traversal (and every tie-break that depends on
/// traversal order) is deterministic.
///
/// The same shape also carries the transposed view (item title -> user id ->
/// rating) produced by [`RatingMatrix::transpose`]; in that case the outer
/// keys are items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingMatrix {
    prefs: BTreeMap<UserId, UserRatings>,
}

impl RatingMatrix {
    /// Creates a new, empty matrix
    pub fn new() -> Self {
        Self {
            prefs: BTreeMap::new(),
        }
    }

    /// Insert (or overwrite) a rating, returning the previous value if any
    pub fn insert(
        &mut self,
        user: impl Into<UserId>,
        item: impl Into<ItemTitle>,
        rating: f64,
    ) -> Option<f64> {
        self.prefs
            .entry(user.into())
            .or_default()
            .insert(item.into(), rating)
    }

    /// Remove a single rating.
    ///
    /// The user's entry is kept even when it becomes empty, so that
    /// re-inserting the rating restores an identical matrix.
    pub fn remove(&mut self, user: &str, item: &str) -> Option<f64> {
        self.prefs.get_mut(user)?.remove(item)
    }

    /// Get all ratings made by a user
    pub fn get_user_ratings(&self, user: &str) -> Option<&UserRatings> {
        self.prefs.get(user)
    }

    /// Get one rating
    pub fn get(&self, user: &str, item: &str) -> Option<f64> {
        self.prefs.get(user)?.get(item).copied()
    }

    /// True if `user` has rated `item`
    pub fn contains(&self, user: &str, item: &str) -> bool {
        self.get(user, item).is_some()
    }

    /// Iterate over users in key order
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.prefs.keys().map(String::as_str)
    }

    /// Iterate over (user, ratings) in key order
    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &UserRatings)> {
        self.prefs.iter()
    }

    /// Every (user, item, rating) triple, in key order
    pub fn triples(&self) -> Vec<(UserId, ItemTitle, f64)> {
        self.prefs
            .iter()
            .flat_map(|(user, ratings)| {
                ratings
                    .iter()
                    .map(move |(item, &rating)| (user.clone(), item.clone(), rating))
            })
            .collect()
    }

    /// Number of users (outer keys)
    pub fn len(&self) -> usize {
        self.prefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefs.is_empty()
    }

    /// Total number of (user, item) ratings
    pub fn rating_count(&self) -> usize {
        self.prefs.values().map(BTreeMap::len).sum()
    }

    /// Flip the matrix: user -> item -> rating becomes item -> user -> rating
    pub fn transpose(&self) -> RatingMatrix {
        let mut result = RatingMatrix::new();
        for (user, ratings) in &self.prefs {
            for (item, &rating) in ratings {
                result.insert(item.clone(), user.clone(), rating);
            }
        }
        result
    }
}

// =============================================================================
// Item Catalog
// =============================================================================

/// Bijection between 1-based item ids and item titles.
///
/// Ids are dense: the catalog holds exactly the ids `1..=len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemCatalog {
    titles: Vec<ItemTitle>,
    ids: HashMap<ItemTitle, ItemId>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from titles listed in id order (first title gets id 1)
    pub fn from_titles<I, S>(titles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemTitle>,
    {
        let mut catalog = Self::new();
        for title in titles {
            catalog.push(title)?;
        }
        Ok(catalog)
    }

    /// Append a title, assigning it the next id
    pub fn push(&mut self, title: impl Into<ItemTitle>) -> Result<ItemId> {
        let title = title.into();
        let id = self.titles.len() as ItemId + 1;
        if let Some(&first) = self.ids.get(&title) {
            return Err(DataLoadError::DuplicateTitle {
                title,
                first,
                second: id,
            });
        }
        self.ids.insert(title.clone(), id);
        self.titles.push(title);
        Ok(id)
    }

    /// Insert a title under an explicit id, which must be the next one in sequence
    pub fn insert(&mut self, id: ItemId, title: impl Into<ItemTitle>) -> Result<()> {
        let expected = self.titles.len() as ItemId + 1;
        if id != expected {
            return Err(DataLoadError::InvalidValue {
                field: "item id".to_string(),
                value: format!("{id} (expected {expected})"),
            });
        }
        self.push(title).map(|_| ())
    }

    /// Title for an id
    pub fn title(&self, id: ItemId) -> Option<&str> {
        let index = (id as usize).checked_sub(1)?;
        self.titles.get(index).map(String::as_str)
    }

    /// Id for a title
    pub fn id_of(&self, title: &str) -> Option<ItemId> {
        self.ids.get(title).copied()
    }

    /// Zero-based row index for a title (aligned with the feature matrix)
    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.id_of(title).map(|id| id as usize - 1)
    }

    /// Iterate (id, title) in id order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &str)> {
        self.titles
            .iter()
            .enumerate()
            .map(|(index, title)| (index as ItemId + 1, title.as_str()))
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

// =============================================================================
// Features
// =============================================================================

/// Binary item x genre matrix. Row `id - 1` belongs to item `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: Vec<Vec<u8>>,
    width: usize,
}

impl FeatureMatrix {
    /// Build from rows, checking that every row has the same width and only 0/1 values
    pub fn new(rows: Vec<Vec<u8>>) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(DataLoadError::FieldCountMismatch {
                    expected: width,
                    found: row.len(),
                    line: index + 1,
                });
            }
            if let Some(&value) = row.iter().find(|&&v| v > 1) {
                return Err(DataLoadError::InvalidValue {
                    field: format!("feature flag of item {}", index + 1),
                    value: value.to_string(),
                });
            }
        }
        Ok(Self { rows, width })
    }

    /// Feature row at a zero-based index
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Number of rows (items)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns (genres)
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Ordered column index -> genre name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenreIndex {
    names: Vec<String>,
}

impl GenreIndex {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self, column: usize) -> Option<&str> {
        self.names.get(column).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Everything the recommenders need, loaded together.
///
/// Built by [`Dataset::load_from_files`] or assembled by hand in tests and
/// checked with [`Dataset::validate`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub ratings: RatingMatrix,
    pub catalog: ItemCatalog,
    pub features: FeatureMatrix,
    pub genres: GenreIndex,
}
