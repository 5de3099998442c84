//! CART (Classification and Regression Tree) builder
//!
//! Implements exact-greedy regression tree construction with the
//! squared-error criterion. Randomness (feature sub-sampling) comes only from
//! the caller's RNG, so a fixed seed reproduces the same tree.

use rand::rngs::StdRng;
use rand::seq::index;
use rumah_core::{Node, RegressionTree};

/// Growth limits for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn per node
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }
}

/// Split candidate
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// `sum_l^2 / n_l + sum_r^2 / n_r`; maximizing it minimizes child SSE.
    score: f64,
}

/// Build regression trees over a shared feature matrix
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [Vec<f64>], targets: &'a [f64], config: TreeConfig) -> Self {
        assert_eq!(features.len(), targets.len());

        let feature_count = features.first().map(|row| row.len()).unwrap_or(0);

        Self {
            config,
            features,
            targets,
            feature_count,
        }
    }

    /// Grow a tree on `sample` (row indices, repeats allowed).
    pub fn build(&self, sample: &[usize], rng: &mut StdRng) -> RegressionTree {
        let mut nodes = Vec::new();
        self.build_node(sample.to_vec(), 0, &mut nodes, rng);
        RegressionTree::new(nodes)
    }

    /// Recursively build tree nodes; children are always pushed after their parent.
    fn build_node(
        &self,
        indices: Vec<usize>,
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut StdRng,
    ) -> u32 {
        let current_idx = nodes.len() as u32;
        let leaf_value = self.mean_target(&indices);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
            || self.is_pure(&indices)
        {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        let split = match self.find_best_split(&indices, rng) {
            Some(split) => split,
            None => {
                nodes.push(Node::leaf(leaf_value));
                return current_idx;
            }
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&idx| self.features[idx][split.feature_idx] <= split.threshold);

        // Reserve space for current node
        nodes.push(Node::split(split.feature_idx as u32, split.threshold, 0, 0));

        let left_idx = self.build_node(left_indices, depth + 1, nodes, rng);
        let right_idx = self.build_node(right_indices, depth + 1, nodes, rng);

        nodes[current_idx as usize] =
            Node::split(split.feature_idx as u32, split.threshold, left_idx, right_idx);

        current_idx
    }

    /// Find best split over a random subset of features.
    ///
    /// Ties keep the first candidate found, in feature draw order and then
    /// ascending threshold.
    fn find_best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        if self.feature_count == 0 {
            return None;
        }
        let n_draw = self.config.max_features.clamp(1, self.feature_count);
        let drawn = index::sample(rng, self.feature_count, n_draw);

        let mut best: Option<SplitCandidate> = None;
        let mut column: Vec<(f64, f64)> = Vec::with_capacity(indices.len());

        for feature_idx in drawn.iter() {
            column.clear();
            column.extend(
                indices
                    .iter()
                    .map(|&idx| (self.features[idx][feature_idx], self.targets[idx])),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if let Some(candidate) = self.best_threshold(&column, feature_idx) {
                if best.map_or(true, |current| candidate.score > current.score) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Sweep a sorted (value, target) column for the best threshold.
    fn best_threshold(&self, column: &[(f64, f64)], feature_idx: usize) -> Option<SplitCandidate> {
        let n = column.len();
        let total: f64 = column.iter().map(|(_, t)| t).sum();
        let min_leaf = self.config.min_samples_leaf;

        let mut best: Option<SplitCandidate> = None;
        let mut left_sum = 0.0;

        for i in 0..n - 1 {
            left_sum += column[i].1;
            let n_left = i + 1;
            let n_right = n - n_left;

            if n_left < min_leaf {
                continue;
            }
            if n_right < min_leaf {
                break;
            }

            let (lo, hi) = (column[i].0, column[i + 1].0);
            if lo >= hi {
                continue;
            }

            let right_sum = total - left_sum;
            let score =
                left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;

            if best.map_or(true, |current| score > current.score) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi || !threshold.is_finite() {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature_idx,
                    threshold,
                    score,
                });
            }
        }

        best
    }

    fn mean_target(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices.iter().map(|&idx| self.targets[idx]).sum::<f64>() / indices.len() as f64
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        match indices.first() {
            Some(&first) => {
                let value = self.targets[first];
                indices.iter().all(|&idx| self.targets[idx] == value)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features = vec![
            vec![1.0, 10.0],
            vec![2.0, 30.0],
            vec![3.0, 20.0],
            vec![4.0, 40.0],
        ];
        let targets = vec![1.0, 1.0, 5.0, 5.0];
        (features, targets)
    }

    #[test]
    fn test_simple_tree() {
        let (features, targets) = step_data();
        let builder = CartBuilder::new(&features, &targets, TreeConfig::default());
        let mut rng = StdRng::seed_from_u64(0);
        let tree = builder.build(&[0, 1, 2, 3], &mut rng);

        // Feature 0 separates the targets perfectly at 2.5.
        assert_eq!(tree.nodes[0], Node::split(0, 2.5, 1, 2));
        assert_eq!(tree.evaluate(&[2.0, 0.0]), Some(1.0));
        assert_eq!(tree.evaluate(&[3.0, 0.0]), Some(5.0));
        assert!(tree.validate(2).is_ok());
    }

    #[test]
    fn test_leaf_only_tree() {
        let features = vec![vec![1.0]];
        let targets = vec![3.0];
        let builder = CartBuilder::new(&features, &targets, TreeConfig::default());
        let tree = builder.build(&[0], &mut StdRng::seed_from_u64(0));

        assert_eq!(tree.nodes, vec![Node::leaf(3.0)]);
    }

    #[test]
    fn test_max_depth_zero_is_mean_leaf() {
        let (features, targets) = step_data();
        let config = TreeConfig {
            max_depth: Some(0),
            ..TreeConfig::default()
        };
        let builder = CartBuilder::new(&features, &targets, config);
        let tree = builder.build(&[0, 1, 2, 3], &mut StdRng::seed_from_u64(0));

        assert_eq!(tree.nodes, vec![Node::leaf(3.0)]);
    }

    #[test]
    fn test_min_samples_leaf_is_respected() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i)]).collect();
        let targets: Vec<f64> = (0..10).map(|i| if i == 0 { 100.0 } else { 0.0 }).collect();
        let config = TreeConfig {
            min_samples_leaf: 3,
            ..TreeConfig::default()
        };
        let builder = CartBuilder::new(&features, &targets, config);
        let sample: Vec<usize> = (0..10).collect();
        let tree = builder.build(&sample, &mut StdRng::seed_from_u64(0));

        // The outlier cannot be isolated into a leaf of one.
        let Node::Split { threshold, .. } = tree.nodes[0] else {
            panic!("expected a split at the root");
        };
        assert_eq!(threshold, 2.5);
    }

    #[test]
    fn test_constant_feature_gives_leaf() {
        let features = vec![vec![1.0], vec![1.0], vec![1.0]];
        let targets = vec![1.0, 2.0, 3.0];
        let builder = CartBuilder::new(&features, &targets, TreeConfig::default());
        let tree = builder.build(&[0, 1, 2], &mut StdRng::seed_from_u64(0));

        assert_eq!(tree.nodes, vec![Node::leaf(2.0)]);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let features: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let x = f64::from(i);
                vec![x, (x * 7.0) % 11.0, (x * 3.0) % 5.0]
            })
            .collect();
        let targets: Vec<f64> = features.iter().map(|r| r[0] * 0.5 + r[1] - r[2]).collect();
        let config = TreeConfig {
            max_features: 1,
            ..TreeConfig::default()
        };
        let builder = CartBuilder::new(&features, &targets, config);
        let sample: Vec<usize> = (0..40).collect();

        let t1 = builder.build(&sample, &mut StdRng::seed_from_u64(9));
        let t2 = builder.build(&sample, &mut StdRng::seed_from_u64(9));
        assert_eq!(t1, t2);
    }
}
