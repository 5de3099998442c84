//! Randomized hyperparameter search
//!
//! Samples a fixed number of distinct configurations from a discrete grid,
//! scores each one with k-fold cross-validated R² and refits the winner on
//! the whole training partition.

use crate::errors::TrainerError;
use crate::forest::fit_forest;
use crate::metrics::r2_score;
use crate::split::k_fold;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rumah_core::{ForestParams, MaxFeatures, RandomForest};
use tracing::{debug, info};

/// Discrete hyperparameter grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpace {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
    pub max_features: Vec<MaxFeatures>,
}

impl Default for ParamSpace {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200, 300, 500],
            max_depth: vec![None, Some(10), Some(20), Some(30), Some(40)],
            min_samples_split: vec![2, 5, 10],
            min_samples_leaf: vec![1, 2, 4],
            max_features: vec![MaxFeatures::Sqrt, MaxFeatures::Log2, MaxFeatures::All],
        }
    }
}

impl ParamSpace {
    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.min_samples_split.len()
            * self.min_samples_leaf.len()
            * self.max_features.len()
    }

    /// Decode grid point `idx` (mixed radix, last dimension fastest).
    pub fn params_at(&self, idx: usize, seed: u64) -> ForestParams {
        let mut rest = idx;
        let mut digit = |len: usize| {
            let d = rest % len;
            rest /= len;
            d
        };

        let max_features = self.max_features[digit(self.max_features.len())];
        let min_samples_leaf = self.min_samples_leaf[digit(self.min_samples_leaf.len())];
        let min_samples_split = self.min_samples_split[digit(self.min_samples_split.len())];
        let max_depth = self.max_depth[digit(self.max_depth.len())];
        let n_estimators = self.n_estimators[digit(self.n_estimators.len())];

        ForestParams {
            n_estimators,
            max_depth,
            min_samples_split,
            min_samples_leaf,
            max_features,
            seed,
        }
    }
}

/// Search configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Configurations sampled from the grid
    pub n_iter: usize,
    /// Cross-validation folds
    pub cv: usize,
    /// Seed for candidate sampling and for every candidate forest
    pub seed: u64,
    pub space: ParamSpace,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_iter: 20,
            cv: 5,
            seed: 42,
            space: ParamSpace::default(),
        }
    }
}

/// Cross-validation result for one configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Result of a completed search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub best_params: ForestParams,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
    /// Best configuration refit on all rows passed to the search
    pub model: RandomForest,
}

/// Randomized search over a [`ParamSpace`].
pub struct RandomizedSearch {
    config: SearchConfig,
}

impl RandomizedSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Draw `n_iter` distinct grid points (all of them if the grid is smaller).
    pub fn sample_candidates(&self) -> Result<Vec<ForestParams>, TrainerError> {
        let size = self.config.space.size();
        if size == 0 {
            return Err(TrainerError::Training(
                "hyperparameter space has an empty dimension".to_string(),
            ));
        }
        if self.config.n_iter == 0 {
            return Err(TrainerError::Training("n_iter must be at least 1".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let picks = index::sample(&mut rng, size, self.config.n_iter.min(size));

        Ok(picks
            .iter()
            .map(|idx| self.config.space.params_at(idx, self.config.seed))
            .collect())
    }

    /// R² on each validation fold for one configuration.
    pub fn cross_validate(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        params: &ForestParams,
    ) -> Result<Vec<f64>, TrainerError> {
        let folds = k_fold(features.len(), self.config.cv)?;
        let mut scores = Vec::with_capacity(folds.len());

        for fold in folds {
            let train_x: Vec<Vec<f64>> = fold.train.iter().map(|&i| features[i].clone()).collect();
            let train_y: Vec<f64> = fold.train.iter().map(|&i| targets[i]).collect();

            let model = fit_forest(&train_x, &train_y, params)?;

            let valid_y: Vec<f64> = fold.validation.iter().map(|&i| targets[i]).collect();
            let predicted = fold
                .validation
                .iter()
                .map(|&i| model.predict(&features[i]))
                .collect::<Result<Vec<f64>, _>>()?;

            scores.push(r2_score(&valid_y, &predicted));
        }

        Ok(scores)
    }

    /// Score every sampled candidate and refit the best one.
    pub fn run(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<SearchOutcome, TrainerError> {
        let candidates = self.sample_candidates()?;
        info!(
            "Randomized search: {} candidates x {} folds over {} rows",
            candidates.len(),
            self.config.cv,
            features.len()
        );

        let mut scored = Vec::with_capacity(candidates.len());
        for (i, params) in candidates.into_iter().enumerate() {
            let fold_scores = self.cross_validate(features, targets, &params)?;
            let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            debug!("  candidate {:>2}: R2={:.4} ({})", i + 1, mean_score, params);

            scored.push(CandidateScore {
                params,
                fold_scores,
                mean_score,
            });
        }

        // Earliest candidate wins ties.
        let best = scored
            .iter()
            .fold(None::<&CandidateScore>, |best, candidate| match best {
                Some(current) if candidate.mean_score <= current.mean_score => Some(current),
                _ => Some(candidate),
            })
            .cloned()
            .ok_or_else(|| TrainerError::Training("no candidates were evaluated".to_string()))?;

        info!("Best configuration: {} (CV R2={:.4})", best.params, best.mean_score);

        let model = fit_forest(features, targets, &best.params)?;

        Ok(SearchOutcome {
            best_params: best.params,
            best_score: best.mean_score,
            candidates: scored,
            model,
        })
    }
}
