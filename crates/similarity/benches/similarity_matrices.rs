//! Benchmarks for the similarity matrices
//!
//! Run with: cargo bench --package similarity
//!
//! Uses seeded synthetic data shaped like MovieLens 100k (19 genres,
//! ratings 1-5) so the numbers are reproducible without the dataset.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{FeatureMatrix, GenreIndex, RatingMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use similarity::{
    build_documents, calculate_similar_items, CancellationToken, CollaborativeConfig,
    CosineSimilarityMatrix, SimilarityMethod,
};

const GENRES: usize = 19;

fn synthetic_documents(items: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    let rows: Vec<Vec<u8>> = (0..items)
        .map(|_| (0..GENRES).map(|_| u8::from(rng.random_bool(0.15))).collect())
        .collect();
    let features = FeatureMatrix::new(rows).expect("synthetic rows are rectangular");
    let genres = GenreIndex::new((0..GENRES).map(|g| format!("Genre{g}")));
    build_documents(&features, &genres)
}

fn synthetic_ratings(users: usize, items: usize, per_user: usize) -> RatingMatrix {
    let mut rng = StdRng::seed_from_u64(7);
    let mut ratings = RatingMatrix::new();
    for user in 0..users {
        for _ in 0..per_user {
            let item = rng.random_range(0..items);
            let rating = f64::from(rng.random_range(1u8..=5));
            ratings.insert(format!("user{user}"), format!("item{item}"), rating);
        }
    }
    ratings
}

fn bench_cosine_matrix(c: &mut Criterion) {
    let documents = synthetic_documents(1000);

    c.bench_function("cosine_from_documents_1000", |b| {
        b.iter(|| {
            let matrix = CosineSimilarityMatrix::from_documents(black_box(&documents));
            black_box(matrix)
        })
    });
}

fn bench_item_item(c: &mut Criterion) {
    let ratings = synthetic_ratings(200, 300, 30);
    let cancel = CancellationToken::new();

    for method in [SimilarityMethod::Euclidean, SimilarityMethod::Pearson] {
        let config = CollaborativeConfig::new(method);
        c.bench_function(&format!("calculate_similar_items_{}", method.name()), |b| {
            b.iter(|| {
                let similar = calculate_similar_items(black_box(&ratings), &config, &cancel).unwrap();
                black_box(similar)
            })
        });
    }
}

criterion_group!(benches, bench_cosine_matrix, bench_item_item);
criterion_main!(benches);
