//! TF-IDF vectorizer over item documents.
//!
//! Weighting follows the usual text-vectorizer defaults:
//! - tokens are lowercased runs of word characters, at least two long
//! - `tf` is the raw count of a token in a document
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1` (smoothed)
//! - each document vector is L2-normalised

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Vocabulary and IDF weights learned from a corpus
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    /// term -> dimension index (terms sorted alphabetically)
    vocabulary: BTreeMap<String, usize>,
    /// IDF weight per dimension
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights of a corpus
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let terms: BTreeSet<&str> = doc_freq.keys().copied().collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let n = documents.len() as f64;
        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &idx) in &vocabulary {
            let df = doc_freq[term.as_str()] as f64;
            idf[idx] = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
        }

        Self { vocabulary, idf }
    }

    /// Fit on a corpus and return the normalised vector of every document
    pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> (Self, Vec<Vec<f64>>) {
        let vectorizer = Self::fit(documents);
        let vectors = documents
            .iter()
            .map(|d| vectorizer.transform(d.as_ref()))
            .collect();
        (vectorizer, vectors)
    }

    /// Dense, L2-normalised TF-IDF vector of a document.
    ///
    /// Tokens outside the vocabulary are ignored; a document with no known
    /// tokens maps to the zero vector.
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in tokenize(document) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                vector[idx] += 1.0;
            }
        }
        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        normalize(&mut vector);
        vector
    }

    /// IDF weight of a term, if it is in the vocabulary
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }

    /// Vocabulary terms in dimension order
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    /// Number of dimensions
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}

/// Split a document into lowercase tokens of two or more word characters.
///
/// `"Sci-Fi"` becomes `["sci", "fi"]`, `"Children's"` becomes `["children"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|s| s.chars().count() >= 2)
        .map(String::from)
        .collect()
}

fn normalize(vector: &mut [f64]) {
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Action Sci-Fi"), vec!["action", "sci", "fi"]);
        assert_eq!(tokenize("Children's War"), vec!["children", "war"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_smoothed_idf() {
        let docs = ["Action", "Action Comedy", "Drama"];
        let vectorizer = TfidfVectorizer::fit(&docs);

        // action in 2 of 3 docs: ln(4/3) + 1
        let expected = (4.0f64 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf("action").unwrap() - expected).abs() < 1e-12);
        // comedy in 1 of 3 docs: ln(4/2) + 1
        let expected = 2.0f64.ln() + 1.0;
        assert!((vectorizer.idf("comedy").unwrap() - expected).abs() < 1e-12);
        assert_eq!(vectorizer.idf("western"), None);
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let vectorizer = TfidfVectorizer::fit(&["Thriller Action", "Comedy"]);
        let terms: Vec<&str> = vectorizer.vocabulary().collect();
        assert_eq!(terms, vec!["action", "comedy", "thriller"]);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let (_, vectors) = TfidfVectorizer::fit_transform(&["Action Comedy", "Comedy", ""]);
        let norm: f64 = vectors[0].iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(vectors[2].iter().all(|&v| v == 0.0));
    }
}
