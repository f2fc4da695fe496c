use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{Dataset, DatasetLayout};
use evaluation::{EvaluationConfig, JsonLinesSink, LoocvEvaluator, LoocvReport};
use recommender::{
    build_recommender, Algorithm, Recommendation, ScoringConfig, ScoringInputs,
    DEFAULT_HYBRID_WEIGHTING, DEFAULT_SIMILARITY_THRESHOLDS,
};
use similarity::{
    build_documents, calculate_similar_items, store_key, CancellationToken, CollaborativeConfig,
    CosineSimilarityMatrix, JsonFileStore, SimilarityMethod, SimilarityStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Hybrid Recs - content, collaborative and hybrid recommender harness
#[derive(Parser)]
#[command(name = "hybrid-recs")]
#[command(about = "Feature-encoding, TF-IDF and hybrid recommenders with LOOCV evaluation", long_about = None)]
struct Cli {
    /// Path to the dataset directory
    #[arg(short, long, default_value = "data/ml-100k")]
    data_dir: PathBuf,

    /// File layout of the dataset directory
    #[arg(long, value_enum, default_value_t = DatasetKind::Ml100k)]
    dataset: DatasetKind,

    /// Where item-item similarity matrices are saved (defaults to the data directory)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dataset statistics
    Info {
        /// Also list this user's ratings
        #[arg(long)]
        user: Option<String>,
    },

    /// Build the TF-IDF cosine similarity matrix and summarise it
    Cosine,

    /// Compute and save (or read back) the item-item similarity matrix
    Similarity {
        #[arg(long, value_enum, default_value_t = MethodArg::Pearson)]
        method: MethodArg,

        /// Significance weighting factor (0 disables)
        #[arg(long, default_value = "25")]
        weighting: usize,

        /// Neighbours kept per item
        #[arg(long, default_value = "100")]
        neighbors: usize,

        /// Drop neighbours below this similarity
        #[arg(long)]
        threshold: Option<f64>,

        /// Read the saved matrix instead of computing it
        #[arg(long)]
        read: bool,
    },

    /// Get recommendations for a user
    Recommend {
        /// User to recommend for
        #[arg(long)]
        user: String,

        #[command(flatten)]
        scoring: ScoringArgs,

        /// Number of recommendations to return
        #[arg(long, default_value = "15")]
        limit: usize,
    },

    /// Leave-one-out cross-validation of an algorithm
    Loocv {
        #[command(flatten)]
        scoring: ScoringArgs,

        /// Evaluate every threshold in {0, 0.3, 0.5, 0.7}
        #[arg(long)]
        sweep: bool,

        /// JSON-lines file trial records are appended to
        #[arg(long, default_value = "results/loocv.jsonl")]
        results: PathBuf,

        /// Denominator of the coverage fraction
        #[arg(long, default_value = "100000")]
        coverage_denominator: usize,
    },
}

#[derive(clap::Args)]
struct ScoringArgs {
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Tfidf)]
    algorithm: AlgorithmArg,

    /// Minimum cosine similarity for a neighbour
    #[arg(long, default_value = "0.0")]
    threshold: f64,

    /// Scale substituted item-item similarities by the hybrid weighting
    #[arg(long)]
    weighted: bool,

    #[arg(long, default_value_t = DEFAULT_HYBRID_WEIGHTING)]
    hybrid_weighting: f64,

    /// Item-item similarity used by the hybrid algorithm
    #[arg(long, value_enum, default_value_t = MethodArg::Pearson)]
    method: MethodArg,
}

impl ScoringArgs {
    fn config(&self) -> ScoringConfig {
        ScoringConfig::new()
            .with_threshold(self.threshold)
            .with_weighted(self.weighted)
            .with_hybrid_weighting(self.hybrid_weighting)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DatasetKind {
    #[value(name = "ml-100k")]
    Ml100k,
    Critics,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Fe,
    Tfidf,
    Hybrid,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Fe => Algorithm::FeatureEncoding,
            AlgorithmArg::Tfidf => Algorithm::Tfidf,
            AlgorithmArg::Hybrid => Algorithm::Hybrid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Distance,
    Pearson,
}

impl From<MethodArg> for SimilarityMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Distance => SimilarityMethod::Euclidean,
            MethodArg::Pearson => SimilarityMethod::Pearson,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let layout = match cli.dataset {
        DatasetKind::Ml100k => DatasetLayout::movielens_100k(),
        DatasetKind::Critics => DatasetLayout::critics(),
    };

    println!("Loading dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let mut dataset = Dataset::load_from_files(&cli.data_dir, &layout)
        .with_context(|| format!("Failed to load dataset from {}", cli.data_dir.display()))?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    let store = JsonFileStore::new(cli.store_dir.unwrap_or_else(|| cli.data_dir.clone()));
    let cancel = CancellationToken::new();
    install_interrupt_handler(&cancel);

    match cli.command {
        Commands::Info { user } => handle_info(&dataset, user.as_deref())?,
        Commands::Cosine => handle_cosine(&dataset),
        Commands::Similarity {
            method,
            weighting,
            neighbors,
            threshold,
            read,
        } => {
            let config = CollaborativeConfig::new(method.into())
                .with_significance_weighting(weighting)
                .with_neighbors(neighbors)
                .with_threshold(threshold);
            handle_similarity(&dataset, &store, &config, read, &cancel)?
        }
        Commands::Recommend {
            user,
            scoring,
            limit,
        } => handle_recommend(&dataset, &store, &user, &scoring, limit)?,
        Commands::Loocv {
            scoring,
            sweep,
            results,
            coverage_denominator,
        } => {
            let config = EvaluationConfig::new().with_coverage_denominator(coverage_denominator);
            handle_loocv(&mut dataset, &store, &scoring, sweep, results, config, &cancel)?
        }
    }

    Ok(())
}

/// Ctrl-C stops long similarity and LOOCV runs between work units.
/// Held-out ratings are restored before the run returns.
fn install_interrupt_handler(cancel: &CancellationToken) {
    let token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || request_stop(&token)) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }
}

fn request_stop(cancel: &CancellationToken) {
    if !cancel.is_cancelled() {
        eprintln!("\n{} Interrupted, stopping after the current unit of work...", "!".yellow());
    }
    cancel.cancel();
}

/// Handle the 'info' command
fn handle_info(dataset: &Dataset, user: Option<&str>) -> Result<()> {
    let (users, items, ratings) = dataset.counts();
    let density = if users * items > 0 {
        100.0 * ratings as f64 / (users * items) as f64
    } else {
        0.0
    };

    println!("{}", "Dataset".bold().blue());
    println!("{}Users: {}", "• ".green(), users);
    println!("{}Items: {}", "• ".green(), items);
    println!("{}Ratings: {}", "• ".green(), ratings);
    println!("{}Density: {:.2}%", "• ".green(), density);
    println!("{}Genres: {}", "• ".green(), dataset.genres.names().join(", "));

    if let Some(user) = user {
        let Some(user_ratings) = dataset.ratings.get_user_ratings(user) else {
            bail!("User {} not found", user);
        };
        let mut sorted: Vec<(&String, &f64)> = user_ratings.iter().collect();
        sorted.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));

        println!("{}", format!("Ratings by {} ({}):", user, sorted.len()).bold().blue());
        for (title, rating) in sorted {
            println!("  - {} ({})", title, rating);
        }
    }
    Ok(())
}

fn build_cosine(dataset: &Dataset) -> CosineSimilarityMatrix {
    let documents = build_documents(&dataset.features, &dataset.genres);
    CosineSimilarityMatrix::from_documents(&documents)
}

/// Handle the 'cosine' command
fn handle_cosine(dataset: &Dataset) {
    let start = Instant::now();
    let cosine = build_cosine(dataset);
    println!(
        "{} Built {}x{} cosine similarity matrix in {:?}",
        "✓".green(),
        cosine.len(),
        cosine.len(),
        start.elapsed()
    );

    let summary = cosine.summary();
    println!("{}", "Similarities strictly between 0 and 1:".bold().blue());
    println!("{}Pairs: {}", "• ".cyan(), summary.count);
    println!("{}Min: {:.3}  Max: {:.3}", "• ".cyan(), summary.min, summary.max);
    println!("{}Mean: {:.3}  Median: {:.3}", "• ".cyan(), summary.mean, summary.median);
    let largest = summary.buckets.iter().copied().max().unwrap_or(0).max(1);
    for (bucket, &count) in summary.buckets.iter().enumerate() {
        let bar = "#".repeat(40 * count / largest);
        println!(
            "  [{:.1}, {:.1}) {:>8} {}",
            bucket as f64 / 10.0,
            (bucket + 1) as f64 / 10.0,
            count,
            bar
        );
    }
}

/// Handle the 'similarity' command
fn handle_similarity(
    dataset: &Dataset,
    store: &JsonFileStore,
    config: &CollaborativeConfig,
    read: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let key = store_key(config.method);

    let similarity = if read {
        store
            .load(&key)
            .with_context(|| format!("Failed to read {} item-item similarity", config.method))?
    } else {
        let start = Instant::now();
        let similarity = calculate_similar_items(&dataset.ratings, config, cancel)
            .context("Failed to compute item-item similarity")?;
        println!(
            "{} Computed {} item-item similarity in {:?}",
            "✓".green(),
            config.method,
            start.elapsed()
        );
        store
            .save(&key, &similarity)
            .with_context(|| format!("Failed to save {}", store.path_for(&key).display()))?;
        println!("{} Saved to {}", "✓".green(), store.path_for(&key).display());
        similarity
    };

    let neighbor_counts: Vec<usize> = similarity.iter().map(|(_, n)| n.len()).collect();
    let total: usize = neighbor_counts.iter().sum();
    println!("{}", format!("Item-item similarity ({})", config.method).bold().blue());
    println!("{}Items: {}", "• ".cyan(), similarity.len());
    println!(
        "{}Average neighbours per item: {:.1}",
        "• ".cyan(),
        total as f64 / similarity.len().max(1) as f64
    );
    Ok(())
}

/// Gather what `algorithm` needs: the cosine matrix is built from the
/// dataset, the item-item matrix is read from the store.
fn scoring_inputs(
    dataset: &Dataset,
    store: &JsonFileStore,
    algorithm: Algorithm,
    method: SimilarityMethod,
) -> Result<ScoringInputs> {
    let mut inputs = ScoringInputs::new(Arc::new(dataset.catalog.clone()))
        .with_features(Arc::new(dataset.features.clone()));

    if algorithm.needs_cosine() {
        inputs = inputs.with_cosine(Arc::new(build_cosine(dataset)));
    }
    if algorithm.needs_item_similarity() {
        let key = store_key(method);
        let item_similarity = store.load(&key).with_context(|| {
            format!("Run `hybrid-recs similarity --method {}` to create it", method_arg_name(method))
        })?;
        inputs = inputs.with_item_similarity(Arc::new(item_similarity));
    }
    Ok(inputs)
}

fn method_arg_name(method: SimilarityMethod) -> &'static str {
    match method {
        SimilarityMethod::Euclidean => "distance",
        SimilarityMethod::Pearson => "pearson",
    }
}

/// Handle the 'recommend' command
fn handle_recommend(
    dataset: &Dataset,
    store: &JsonFileStore,
    user: &str,
    scoring: &ScoringArgs,
    limit: usize,
) -> Result<()> {
    let algorithm = Algorithm::from(scoring.algorithm);
    let inputs = scoring_inputs(dataset, store, algorithm, scoring.method.into())?;
    let recommender = build_recommender(algorithm, &inputs, scoring.config().with_limit(limit))?;

    let start = Instant::now();
    let recommendations = recommender
        .recommend(&dataset.ratings, user)
        .with_context(|| format!("Failed to recommend for user {}", user))?;
    info!("{} recommendations in {:?}", recommender.name(), start.elapsed());

    print_recommendations(recommender.name(), user, &recommendations);
    Ok(())
}

/// Handle the 'loocv' command
fn handle_loocv(
    dataset: &mut Dataset,
    store: &JsonFileStore,
    scoring: &ScoringArgs,
    sweep: bool,
    results: PathBuf,
    config: EvaluationConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let algorithm = Algorithm::from(scoring.algorithm);
    let method = SimilarityMethod::from(scoring.method);
    let inputs = scoring_inputs(dataset, store, algorithm, method)?;
    // Every row names the configured method so rows line up across algorithms
    let similarity = Some(method);

    let evaluator = LoocvEvaluator::new(config);
    let mut sink = JsonLinesSink::open(&results)
        .with_context(|| format!("Failed to open {}", results.display()))?;

    let reports = if sweep {
        evaluator.sweep_thresholds(
            &mut dataset.ratings,
            &DEFAULT_SIMILARITY_THRESHOLDS,
            |threshold| build_recommender(algorithm, &inputs, scoring.config().with_threshold(threshold)),
            similarity,
            &mut sink,
            cancel,
        )?
    } else {
        let recommender = build_recommender(algorithm, &inputs, scoring.config())?;
        vec![evaluator.evaluate(
            &mut dataset.ratings,
            recommender.as_ref(),
            similarity,
            &mut sink,
            cancel,
        )?]
    };

    print_reports(&reports);
    println!("{} Appended {} record(s) to {}", "✓".green(), reports.len(), results.display());
    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(algorithm: &str, user: &str, recommendations: &[Recommendation]) {
    println!("{}", format!("{} recommendations for {}:", algorithm, user).bold().blue());
    if recommendations.is_empty() {
        println!("  (none)");
    }
    for (index, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Predicted rating: {:.3}",
            (index + 1).to_string().green(),
            rec.title,
            rec.score
        );
    }
}

fn print_reports(reports: &[LoocvReport]) {
    let fmt = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.5}"));

    println!(
        "{}",
        format!(
            "{:<6} {:<13} {:>9} {:>8} {:>9} {:>9} {:>9} {:>9}",
            "algo", "similarity", "threshold", "weighted", "MSE", "RMSE", "MAE", "coverage"
        )
        .bold()
        .blue()
    );
    for report in reports {
        let record = &report.record;
        println!(
            "{:<6} {:<13} {:>9} {:>8} {:>9} {:>9} {:>9} {:>9.5}",
            record.algorithm,
            record.similarity.as_deref().unwrap_or("-"),
            record.threshold,
            record.weighted,
            fmt(record.mse),
            fmt(record.rmse),
            fmt(record.mae),
            record.coverage_fraction
        );
    }
}
