//! Random-forest fitting
//!
//! Every tree is grown on a bootstrap sample with its own RNG. Tree seeds are
//! drawn up front from the forest seed, so trees can be grown in parallel and
//! the result does not depend on thread scheduling.

use crate::cart::{CartBuilder, TreeConfig};
use crate::errors::TrainerError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rumah_core::{ForestParams, RandomForest};

/// Fit a forest on `features` / `targets`.
pub fn fit_forest(
    features: &[Vec<f64>],
    targets: &[f64],
    params: &ForestParams,
) -> Result<RandomForest, TrainerError> {
    validate_inputs(features, targets, params)?;

    let n_samples = features.len();
    let feature_count = features[0].len();

    let tree_config = TreeConfig {
        max_depth: params.max_depth,
        min_samples_split: params.min_samples_split,
        min_samples_leaf: params.min_samples_leaf,
        max_features: params.max_features.resolve(feature_count),
    };
    let builder = CartBuilder::new(features, targets, tree_config);

    let mut seeder = StdRng::seed_from_u64(params.seed);
    let tree_seeds: Vec<u64> = (0..params.n_estimators).map(|_| seeder.gen()).collect();

    let trees = tree_seeds
        .par_iter()
        .map(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            builder.build(&sample, &mut rng)
        })
        .collect();

    Ok(RandomForest::new(trees, *params, feature_count))
}

fn validate_inputs(
    features: &[Vec<f64>],
    targets: &[f64],
    params: &ForestParams,
) -> Result<(), TrainerError> {
    if features.is_empty() {
        return Err(TrainerError::Training("cannot fit a forest on zero rows".to_string()));
    }
    if features.len() != targets.len() {
        return Err(TrainerError::Training(format!(
            "{} feature rows but {} targets",
            features.len(),
            targets.len()
        )));
    }

    let feature_count = features[0].len();
    if feature_count == 0 || features.iter().any(|row| row.len() != feature_count) {
        return Err(TrainerError::Training(
            "feature rows must share a non-zero length".to_string(),
        ));
    }
    if let Some(bad) = targets.iter().find(|t| !t.is_finite()) {
        return Err(TrainerError::Training(format!("non-finite target value {bad}")));
    }

    if params.n_estimators == 0 {
        return Err(TrainerError::Training("n_estimators must be at least 1".to_string()));
    }
    if params.min_samples_split < 2 {
        return Err(TrainerError::Training("min_samples_split must be at least 2".to_string()));
    }
    if params.min_samples_leaf < 1 {
        return Err(TrainerError::Training("min_samples_leaf must be at least 1".to_string()));
    }

    Ok(())
}
