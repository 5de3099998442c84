//! Rumah Trainer - reproducible random-forest trainer
//!
//! Loads the housing dataset, runs a seeded randomized hyperparameter search
//! over random-forest regressors on log-prices and produces a
//! [`rumah_core::RandomForest`] ready to be stored and served.

pub mod bootstrap;
pub mod cart;
pub mod dataset;
pub mod errors;
pub mod forest;
pub mod metrics;
pub mod search;
pub mod split;
pub mod trainer;

use std::path::Path;

pub use bootstrap::{load_or_train, BootstrapConfig, Bootstrapped, ModelSource};
pub use dataset::{Dataset, HouseRecord, ATTRIBUTE_COLUMNS, PRICE_COLUMN};
pub use errors::TrainerError;
pub use forest::fit_forest;
pub use search::{CandidateScore, ParamSpace, RandomizedSearch, SearchConfig, SearchOutcome};
pub use trainer::{HoldoutMetrics, HousePriceTrainer, TrainingParams, TrainingReport};

/// Train a model directly from a dataset file using the provided parameters.
pub fn train_model_from_path(
    path: &Path,
    params: TrainingParams,
) -> Result<TrainingReport, TrainerError> {
    let dataset = Dataset::from_path(path)?;
    HousePriceTrainer::new(params).train(&dataset)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
