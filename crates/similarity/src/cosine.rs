//! Dense item x item cosine similarity over TF-IDF document vectors.

use crate::tfidf::TfidfVectorizer;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

/// Square, symmetric similarity matrix with values in [0, 1].
///
/// Row/column `k` belongs to the item with id `k + 1`. The matrix is
/// read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct CosineSimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl CosineSimilarityMatrix {
    /// Fit TF-IDF on the documents (one per item, in item order) and
    /// compute every pairwise cosine similarity.
    ///
    /// The diagonal is exactly 1 for non-empty documents and 0 for empty
    /// ones; pairs sharing no token are 0.
    #[instrument(skip(documents), fields(count = documents.len()))]
    pub fn from_documents<S: AsRef<str> + Sync>(documents: &[S]) -> Self {
        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(documents);
        debug!("TF-IDF vocabulary has {} terms", vectorizer.len());

        let matrix = Self::from_vectors(&vectors);
        info!("Built {0}x{0} cosine similarity matrix", matrix.size);
        matrix
    }

    /// Cosine similarity of already L2-normalised vectors
    pub fn from_vectors(vectors: &[Vec<f64>]) -> Self {
        let size = vectors.len();
        let non_empty: Vec<bool> = vectors
            .iter()
            .map(|v| v.iter().any(|&x| x != 0.0))
            .collect();

        let rows: Vec<Vec<f64>> = (0..size)
            .into_par_iter()
            .map(|i| {
                (0..size)
                    .map(|j| {
                        if i == j {
                            if non_empty[i] { 1.0 } else { 0.0 }
                        } else {
                            dot(&vectors[i], &vectors[j]).clamp(0.0, 1.0)
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            size,
            values: rows.into_iter().flatten().collect(),
        }
    }

    /// Build directly from row-major values (must be `size * size` long)
    pub fn from_raw(size: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == size * size).then_some(Self { size, values })
    }

    /// Similarity between zero-based item indices
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// One row of the matrix
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Number of items (rows == columns)
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Summary of the off-diagonal similarities that are neither 0 nor 1
    pub fn summary(&self) -> SimilaritySummary {
        let mut values: Vec<f64> = (0..self.size)
            .flat_map(|i| (0..i).map(move |j| (i, j)))
            .map(|(i, j)| self.get(i, j))
            .filter(|&v| v != 0.0 && v != 1.0)
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = if count > 0 {
            values.iter().sum::<f64>() / count as f64
        } else {
            0.0
        };
        let mut buckets = [0usize; 10];
        for &v in &values {
            let bucket = ((v * 10.0) as usize).min(9);
            buckets[bucket] += 1;
        }

        SimilaritySummary {
            count,
            min: values.first().copied().unwrap_or(0.0),
            max: values.last().copied().unwrap_or(0.0),
            mean,
            median: values.get(count / 2).copied().unwrap_or(0.0),
            buckets,
        }
    }
}

/// Distribution of the partial (0 < s < 1) similarities in a matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SimilaritySummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Counts per tenth of [0, 1]
    pub buckets: [usize; 10],
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
