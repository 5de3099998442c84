//! Rumah Trainer CLI
//!
//! Offline trainer for producing a house-price model file ahead of serving.

use anyhow::{Context, Result};
use clap::Parser;
use rumah_core::ModelStore;
use rumah_trainer::{Dataset, HousePriceTrainer, SearchConfig, TrainingParams};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "rumah-train")]
#[command(author = "Rumah Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random-forest trainer for house-price prediction", long_about = None)]
struct Args {
    /// Input dataset path (.xlsx, .xls, .ods or .csv)
    #[arg(short, long)]
    input: PathBuf,

    /// Output model file
    #[arg(short, long, default_value = "model.bin")]
    output: PathBuf,

    /// Configurations sampled by the randomized search
    #[arg(long, default_value = "20")]
    n_iter: usize,

    /// Cross-validation folds
    #[arg(long, default_value = "5")]
    cv: usize,

    /// Seed for the split, the search and every forest
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Rumah house-price trainer v{}", env!("CARGO_PKG_VERSION"));

    info!("Loading dataset from: {}", args.input.display());
    let dataset = Dataset::from_path(&args.input).context("Failed to load dataset")?;
    info!(
        "Loaded {} samples ({} rows dropped for missing values)",
        dataset.len(),
        dataset.dropped_rows
    );

    let params = TrainingParams {
        test_fraction: args.test_fraction,
        split_seed: args.seed,
        search: SearchConfig {
            n_iter: args.n_iter,
            cv: args.cv,
            seed: args.seed,
            ..SearchConfig::default()
        },
    };

    info!("Training configuration:");
    info!("  Search iterations: {}", params.search.n_iter);
    info!("  CV folds: {}", params.search.cv);
    info!("  Seed: {}", args.seed);
    info!("  Grid size: {}", params.search.space.size());

    let report = HousePriceTrainer::new(params)
        .train(&dataset)
        .context("Training failed")?;

    info!("Best parameters: {}", report.best_params);
    info!("CV R2 (log price): {:.4}", report.cv_score);
    match &report.holdout {
        Some(holdout) => {
            info!("Holdout R2: {:.2}%", holdout.r2 * 100.0);
            info!("Holdout MAE: {:.0}", holdout.mae);
            info!("Holdout RMSE: {:.0}", holdout.rmse);
        }
        None => info!("Dataset too small for a holdout evaluation"),
    }

    ModelStore::new(&args.output)
        .save(&report.model)
        .context("Failed to write model file")?;

    info!("Training completed successfully");
    info!("  Model: {}", args.output.display());
    info!("  Trees: {}", report.model.trees.len());
    info!("  Nodes: {}", report.model.node_count());

    Ok(())
}
