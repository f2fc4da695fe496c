//! Integration tests for leave-one-out evaluation.

use data_loader::{FeatureMatrix, GenreIndex, ItemCatalog, RatingMatrix};
use evaluation::{
    EvaluationConfig, EvaluationError, JsonLinesSink, LoocvEvaluator, MemorySink, ResultSink,
};
use recommender::{
    build_recommender, Algorithm, Prediction, Recommendation, RecommendError, Recommender,
    ScoringConfig, ScoringInputs, DEFAULT_SIMILARITY_THRESHOLDS,
};
use similarity::{
    build_documents, calculate_similar_items, CancellationToken, CollaborativeConfig,
    CosineSimilarityMatrix, SimilarityMethod,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The critics set: seven critics, six films
fn create_test_ratings() -> RatingMatrix {
    let mut ratings = RatingMatrix::new();
    for (user, item, rating) in [
        ("Lisa", "Lady in the Water", 2.5),
        ("Lisa", "Snakes on a Plane", 3.5),
        ("Lisa", "Just My Luck", 3.0),
        ("Lisa", "Superman Returns", 3.5),
        ("Lisa", "You, Me and Dupree", 2.5),
        ("Lisa", "The Night Listener", 3.0),
        ("Gene", "Lady in the Water", 3.0),
        ("Gene", "Snakes on a Plane", 3.5),
        ("Gene", "Just My Luck", 1.5),
        ("Gene", "Superman Returns", 5.0),
        ("Gene", "The Night Listener", 3.0),
        ("Gene", "You, Me and Dupree", 3.5),
        ("Michael", "Lady in the Water", 2.5),
        ("Michael", "Snakes on a Plane", 3.0),
        ("Michael", "Superman Returns", 3.5),
        ("Michael", "The Night Listener", 4.0),
        ("Claudia", "Snakes on a Plane", 3.5),
        ("Claudia", "Just My Luck", 3.0),
        ("Claudia", "The Night Listener", 4.5),
        ("Claudia", "Superman Returns", 4.0),
        ("Claudia", "You, Me and Dupree", 2.5),
        ("Mick", "Lady in the Water", 3.0),
        ("Mick", "Snakes on a Plane", 4.0),
        ("Mick", "Just My Luck", 2.0),
        ("Mick", "Superman Returns", 3.0),
        ("Mick", "The Night Listener", 3.0),
        ("Mick", "You, Me and Dupree", 2.0),
        ("Jack", "Lady in the Water", 3.0),
        ("Jack", "Snakes on a Plane", 4.0),
        ("Jack", "The Night Listener", 3.0),
        ("Jack", "Superman Returns", 5.0),
        ("Jack", "You, Me and Dupree", 3.5),
        ("Toby", "Snakes on a Plane", 4.5),
        ("Toby", "You, Me and Dupree", 1.0),
        ("Toby", "Superman Returns", 4.0),
    ] {
        ratings.insert(user, item, rating);
    }
    ratings
}

fn create_test_inputs(ratings: &RatingMatrix) -> ScoringInputs {
    let genres = GenreIndex::new(["Action", "Comedy", "Drama", "Fantasy", "Thriller"]);
    let items: [(&str, [u8; 5]); 6] = [
        ("Lady in the Water", [0, 0, 1, 1, 0]),
        ("Snakes on a Plane", [1, 0, 0, 0, 1]),
        ("Just My Luck", [0, 1, 0, 1, 0]),
        ("Superman Returns", [1, 0, 0, 1, 0]),
        ("You, Me and Dupree", [0, 1, 0, 0, 0]),
        ("The Night Listener", [0, 0, 1, 0, 1]),
    ];
    let catalog = ItemCatalog::from_titles(items.iter().map(|(title, _)| *title)).unwrap();
    let features = FeatureMatrix::new(items.iter().map(|(_, row)| row.to_vec()).collect()).unwrap();
    let cosine = CosineSimilarityMatrix::from_documents(&build_documents(&features, &genres));
    let item_similarity = calculate_similar_items(
        ratings,
        &CollaborativeConfig::new(SimilarityMethod::Pearson),
        &CancellationToken::new(),
    )
    .unwrap();

    ScoringInputs::new(Arc::new(catalog))
        .with_features(Arc::new(features))
        .with_cosine(Arc::new(cosine))
        .with_item_similarity(Arc::new(item_similarity))
}

/// Predicts the excluded item for the first `fail_after` calls, then fails
struct FailingRecommender {
    calls: AtomicUsize,
    fail_after: usize,
    config: ScoringConfig,
}

impl Recommender for FailingRecommender {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Tfidf
    }

    fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn recommend(&self, _: &RatingMatrix, _: &str) -> recommender::Result<Vec<Recommendation>> {
        Ok(Vec::new())
    }

    fn predict(&self, _: &RatingMatrix, _: &str, excluded: &str) -> recommender::Result<Prediction> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
            return Err(RecommendError::UnknownItem {
                title: excluded.to_string(),
            });
        }
        Ok(Prediction::new(Some(3.0), excluded))
    }
}

#[test]
fn test_every_algorithm_restores_ratings() {
    let mut ratings = create_test_ratings();
    let before = ratings.clone();
    let inputs = create_test_inputs(&ratings);
    let evaluator = LoocvEvaluator::new(EvaluationConfig::default());
    let mut sink = MemorySink::new();

    for algorithm in Algorithm::ALL {
        let recommender = build_recommender(algorithm, &inputs, ScoringConfig::default()).unwrap();
        let report = evaluator
            .evaluate(
                &mut ratings,
                recommender.as_ref(),
                Some(SimilarityMethod::Pearson),
                &mut sink,
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(ratings, before);
        assert_eq!(report.record.trials, before.rating_count());
        assert!(report.metrics.coverage <= before.rating_count());
        assert_eq!(report.errors.len(), report.metrics.coverage);
        assert!(report.metrics.coverage > 0, "{algorithm} made no predictions");
        assert_eq!(report.record.algorithm, algorithm.name());
        // Content-only runs still name the configured method
        assert_eq!(report.record.similarity.as_deref(), Some("sim_pearson"));
    }
    assert_eq!(sink.records().len(), 3);
}

#[test]
fn test_restores_ratings_on_failure() {
    let mut ratings = create_test_ratings();
    let before = ratings.clone();
    let failing = FailingRecommender {
        calls: AtomicUsize::new(0),
        fail_after: 7,
        config: ScoringConfig::default(),
    };
    let mut sink = MemorySink::new();

    let result = LoocvEvaluator::default().evaluate(
        &mut ratings,
        &failing,
        None,
        &mut sink,
        &CancellationToken::new(),
    );

    assert!(matches!(result, Err(EvaluationError::Recommend(_))));
    assert_eq!(ratings, before);
    assert!(sink.records().is_empty());
}

#[test]
fn test_cancelled_before_start() {
    let mut ratings = create_test_ratings();
    let before = ratings.clone();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let failing = FailingRecommender {
        calls: AtomicUsize::new(0),
        fail_after: usize::MAX,
        config: ScoringConfig::default(),
    };

    let result = LoocvEvaluator::default().evaluate(
        &mut ratings,
        &failing,
        None,
        &mut MemorySink::new(),
        &cancel,
    );
    assert!(matches!(
        result,
        Err(EvaluationError::Cancelled { processed: 0, total: 7 })
    ));
    assert_eq!(ratings, before);
}

#[test]
fn test_metrics_from_constant_predictor() {
    let mut ratings = create_test_ratings();
    let constant = FailingRecommender {
        calls: AtomicUsize::new(0),
        fail_after: usize::MAX,
        config: ScoringConfig::new().with_threshold(0.5),
    };
    let evaluator = LoocvEvaluator::new(EvaluationConfig::new().with_coverage_denominator(70));

    let report = evaluator
        .evaluate(&mut ratings, &constant, None, &mut MemorySink::new(), &CancellationToken::new())
        .unwrap();

    assert_eq!(report.metrics.coverage, 35);
    assert!((report.metrics.coverage_fraction - 0.5).abs() < 1e-12);
    assert_eq!(report.record.threshold, 0.5);
    assert_eq!(report.record.similarity, None);

    let expected_mae = report.pairs.iter().map(|(t, _)| (t - 3.0).abs()).sum::<f64>() / 35.0;
    assert!((report.metrics.mae.unwrap() - expected_mae).abs() < 1e-12);
    let expected_mse = report.errors.iter().sum::<f64>() / 35.0;
    assert!((report.metrics.mse.unwrap() - expected_mse).abs() < 1e-12);
}

#[test]
fn test_empty_dataset() {
    let mut ratings = RatingMatrix::new();
    let constant = FailingRecommender {
        calls: AtomicUsize::new(0),
        fail_after: usize::MAX,
        config: ScoringConfig::default(),
    };
    let result = LoocvEvaluator::default().evaluate(
        &mut ratings,
        &constant,
        None,
        &mut MemorySink::new(),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(EvaluationError::EmptyDataset)));
}

#[test]
fn test_threshold_sweep_writes_one_row_per_threshold() {
    let mut ratings = create_test_ratings();
    let before = ratings.clone();
    let inputs = create_test_inputs(&ratings);
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonLinesSink::open(dir.path().join("loocv.jsonl")).unwrap();

    let reports = LoocvEvaluator::default()
        .sweep_thresholds(
            &mut ratings,
            &DEFAULT_SIMILARITY_THRESHOLDS,
            |threshold| {
                build_recommender(
                    Algorithm::Tfidf,
                    &inputs,
                    ScoringConfig::new().with_threshold(threshold),
                )
            },
            Some(SimilarityMethod::Euclidean),
            &mut sink,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(ratings, before);
    assert_eq!(reports.len(), 4);
    let rows: Vec<usize> = reports.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![0, 1, 2, 3]);

    let records = sink.read_all().unwrap();
    let thresholds: Vec<f64> = records.iter().map(|r| r.threshold).collect();
    assert_eq!(thresholds, DEFAULT_SIMILARITY_THRESHOLDS.to_vec());
    assert!(records.iter().all(|r| r.similarity.as_deref() == Some("sim_distance")));

    // Raising the threshold can only shrink neighbourhoods
    for pair in reports.windows(2) {
        assert!(pair[1].metrics.coverage <= pair[0].metrics.coverage);
    }

    let mut more = JsonLinesSink::open(sink.path()).unwrap();
    assert_eq!(more.append(&records[0]).unwrap(), 4);
}
