//! Startup model acquisition
//!
//! Loads the persisted model if one is usable, otherwise trains a fresh one
//! from the dataset and persists it for the next start.

use crate::dataset::Dataset;
use crate::errors::TrainerError;
use crate::trainer::{HousePriceTrainer, TrainingParams};
use rumah_core::{ModelStore, RandomForest, StoreError};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Where the model comes from and how to train one if needed.
#[derive(Clone, Debug)]
pub struct BootstrapConfig {
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub training: TrainingParams,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.bin"),
            dataset_path: PathBuf::from("dataset.xlsx"),
            training: TrainingParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSource {
    Loaded,
    Trained,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Loaded => write!(f, "loaded"),
            ModelSource::Trained => write!(f, "trained"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Bootstrapped {
    pub model: RandomForest,
    pub source: ModelSource,
}

/// Load the model at `config.model_path`, or train and save a new one.
///
/// A missing or unreadable model file is not an error; training failures and
/// save failures are.
pub fn load_or_train(config: &BootstrapConfig) -> Result<Bootstrapped, TrainerError> {
    let store = ModelStore::new(&config.model_path);

    match store.load() {
        Ok(model) => {
            info!("Using existing model from {}", config.model_path.display());
            return Ok(Bootstrapped {
                model,
                source: ModelSource::Loaded,
            });
        }
        Err(StoreError::NotFound(_)) => {
            warn!(
                "No model at {}, training from {}",
                config.model_path.display(),
                config.dataset_path.display()
            );
        }
        Err(err) => {
            warn!(
                "Could not load model from {} ({err}), retraining",
                config.model_path.display()
            );
        }
    }

    let dataset = Dataset::from_path(&config.dataset_path)?;
    info!("Loaded {} samples", dataset.len());

    let report = HousePriceTrainer::new(config.training.clone()).train(&dataset)?;
    store.save(&report.model)?;

    Ok(Bootstrapped {
        model: report.model,
        source: ModelSource::Trained,
    })
}
