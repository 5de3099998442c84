//! Fitted random forest with averaged inference.

use super::params::ForestParams;
use super::tree::RegressionTree;
use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

/// A fitted random-forest regressor. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Trees in the ensemble
    pub trees: Vec<RegressionTree>,

    /// Configuration the forest was grown with
    pub params: ForestParams,

    /// Length of the feature vectors the forest was trained on
    pub feature_count: usize,
}

impl RandomForest {
    pub fn new(trees: Vec<RegressionTree>, params: ForestParams, feature_count: usize) -> Self {
        Self {
            trees,
            params,
            feature_count,
        }
    }

    /// Predict a single row: the mean of the tree outputs.
    pub fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.feature_count {
            return Err(ModelError::FeatureCount {
                expected: self.feature_count,
                actual: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }

        let mut sum = 0.0;
        for (i, tree) in self.trees.iter().enumerate() {
            sum += tree.evaluate(features).ok_or_else(|| {
                ModelError::ValidationFailed(format!("tree {i} could not be evaluated"))
            })?;
        }

        Ok(sum / self.trees.len() as f64)
    }

    /// Predict many rows.
    pub fn predict_batch<R: AsRef<[f64]>>(&self, rows: &[R]) -> Result<Vec<f64>, ModelError> {
        rows.iter().map(|row| self.predict(row.as_ref())).collect()
    }

    /// Validate forest structure.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count).map_err(|e| {
                ModelError::ValidationFailed(format!("tree {i} validation failed: {e}"))
            })?;
        }

        Ok(())
    }

    /// Total node count across all trees.
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|tree| tree.nodes.len()).sum()
    }
}
