//! House-price trainer
//!
//! Turns a cleaned [`Dataset`] into a fitted forest over log-prices:
//! feature engineering, reproducible train/test split, randomized search and
//! a holdout evaluation in price scale.

use crate::dataset::Dataset;
use crate::errors::TrainerError;
use crate::metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
use crate::search::{CandidateScore, RandomizedSearch, SearchConfig};
use crate::split::train_test_split;
use rumah_core::{ForestParams, RandomForest, FEATURE_NAMES};
use tracing::{debug, info};

/// Training configuration
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingParams {
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
    pub search: SearchConfig,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            split_seed: 42,
            search: SearchConfig::default(),
        }
    }
}

/// Price-scale metrics on the held-out partition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldoutMetrics {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    pub samples: usize,
}

/// Everything a training run produces.
#[derive(Clone, Debug)]
pub struct TrainingReport {
    pub model: RandomForest,
    pub best_params: ForestParams,
    /// Mean cross-validated R² of the best configuration (log-price scale)
    pub cv_score: f64,
    pub candidates: Vec<CandidateScore>,
    pub train_samples: usize,
    /// `None` when the dataset is too small to hold anything out
    pub holdout: Option<HoldoutMetrics>,
}

/// House-price trainer
pub struct HousePriceTrainer {
    params: TrainingParams,
}

impl HousePriceTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    /// Train a model on the given dataset
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingReport, TrainerError> {
        if dataset.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }

        let features: Vec<Vec<f64>> = dataset
            .features()
            .iter()
            .map(|row| row.as_slice().to_vec())
            .collect();
        let targets = dataset.log_targets();

        if dataset.dropped_rows > 0 {
            info!("Dropped {} rows with missing values", dataset.dropped_rows);
        }
        for (name, (min, max)) in FEATURE_NAMES.iter().zip(dataset.feature_stats()) {
            debug!("  {:<12} [{:.2}, {:.2}]", name, min, max);
        }

        let split = train_test_split(
            dataset.len(),
            self.params.test_fraction,
            self.params.split_seed,
        );
        info!(
            "Split {} rows into {} train / {} test (seed {})",
            dataset.len(),
            split.train.len(),
            split.test.len(),
            self.params.split_seed
        );

        let train_x: Vec<Vec<f64>> = split.train.iter().map(|&i| features[i].clone()).collect();
        let train_y: Vec<f64> = split.train.iter().map(|&i| targets[i]).collect();

        let search = RandomizedSearch::new(self.params.search.clone());
        let outcome = search.run(&train_x, &train_y)?;

        let holdout = if split.test.is_empty() {
            None
        } else {
            let actual: Vec<f64> = split.test.iter().map(|&i| targets[i].exp()).collect();
            let predicted = split
                .test
                .iter()
                .map(|&i| outcome.model.predict(&features[i]).map(f64::exp))
                .collect::<Result<Vec<f64>, _>>()?;

            Some(HoldoutMetrics {
                r2: r2_score(&actual, &predicted),
                mae: mean_absolute_error(&actual, &predicted),
                rmse: root_mean_squared_error(&actual, &predicted),
                samples: actual.len(),
            })
        };

        if let Some(metrics) = &holdout {
            info!(
                "Holdout: R2={:.2}% MAE={:.0} RMSE={:.0} ({} rows)",
                metrics.r2 * 100.0,
                metrics.mae,
                metrics.rmse,
                metrics.samples
            );
        }

        Ok(TrainingReport {
            model: outcome.model,
            best_params: outcome.best_params,
            cv_score: outcome.best_score,
            candidates: outcome.candidates,
            train_samples: train_x.len(),
            holdout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::HouseRecord;
    use crate::search::ParamSpace;
    use rumah_core::{MaxFeatures, RawAttributes};

    fn synthetic_dataset(n: usize) -> Dataset {
        let records = (0..n)
            .map(|i| {
                let i = i as f64;
                let floor_area = 40.0 + (i * 17.0) % 260.0;
                let land_area = 60.0 + (i * 29.0) % 340.0;
                let bedrooms = 1.0 + (i % 5.0);
                let bathrooms = 1.0 + (i % 3.0);
                let garages = i % 3.0;
                let price = 1.0e8 + floor_area * 9.0e6 + land_area * 4.0e6 + garages * 5.0e7;
                HouseRecord {
                    price,
                    attributes: RawAttributes {
                        floor_area,
                        land_area,
                        bedrooms,
                        bathrooms,
                        garages,
                    },
                }
            })
            .collect();
        Dataset::from_records(records)
    }

    fn quick_params() -> TrainingParams {
        TrainingParams {
            search: SearchConfig {
                n_iter: 3,
                cv: 3,
                seed: 42,
                space: ParamSpace {
                    n_estimators: vec![5, 10],
                    max_depth: vec![None, Some(6)],
                    min_samples_split: vec![2],
                    min_samples_leaf: vec![1, 2],
                    max_features: vec![MaxFeatures::Sqrt, MaxFeatures::All],
                },
            },
            ..TrainingParams::default()
        }
    }

    #[test]
    fn test_train_report() {
        let dataset = synthetic_dataset(50);
        let report = HousePriceTrainer::new(quick_params()).train(&dataset).unwrap();

        assert_eq!(report.train_samples, 40);
        assert_eq!(report.candidates.len(), 3);
        assert_eq!(report.model.feature_count, rumah_core::FEATURE_COUNT);
        assert_eq!(report.model.params, report.best_params);

        let holdout = report.holdout.unwrap();
        assert_eq!(holdout.samples, 10);
        assert!(holdout.mae >= 0.0 && holdout.rmse >= holdout.mae);
    }

    #[test]
    fn test_empty_dataset() {
        let trainer = HousePriceTrainer::new(quick_params());
        assert!(matches!(
            trainer.train(&Dataset::default()),
            Err(TrainerError::EmptyDataset)
        ));
    }

    #[test]
    fn test_too_small_for_cross_validation() {
        let trainer = HousePriceTrainer::new(quick_params());
        assert!(matches!(
            trainer.train(&synthetic_dataset(2)),
            Err(TrainerError::Training(_))
        ));
    }
}
