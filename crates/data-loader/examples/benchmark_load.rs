use data_loader::{Dataset, DatasetLayout};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/ml-100k");

    println!("Loading MovieLens 100K dataset...\n");

    let start = Instant::now();
    let dataset = Dataset::load_from_files(data_dir, &DatasetLayout::movielens_100k())
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (users, items, ratings) = dataset.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Items: {}", items);
    println!("Ratings: {}", ratings);
    println!("Genres: {}", dataset.genres.len());
    println!("\nPerformance: {:.0} ratings/second",
             ratings as f64 / elapsed.as_secs_f64());
}
