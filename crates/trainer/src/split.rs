//! Reproducible train/test splitting and k-fold cross-validation
//!
//! All randomness comes from `StdRng` seeded explicitly, so identical inputs
//! and seeds give identical partitions.

use crate::errors::TrainerError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a train/test partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_fraction)` rows.
///
/// With at least two rows both partitions are non-empty. A single row goes to
/// the training partition.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> TrainTestSplit {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = if n < 2 {
        0
    } else {
        ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1)
    };

    let train = indices.split_off(n_test);
    TrainTestSplit {
        train,
        test: indices,
    }
}

/// One cross-validation fold, as positions into the partition being folded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Contiguous, unshuffled k-fold partitioning.
///
/// The first `n % k` folds hold one extra row. `k` is clamped to `n`.
pub fn k_fold(n: usize, k: usize) -> Result<Vec<Fold>, TrainerError> {
    let k = k.min(n);
    if k < 2 {
        return Err(TrainerError::Training(format!(
            "cross-validation needs at least 2 folds, have {n} training rows"
        )));
    }

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;

    for fold_idx in 0..k {
        let size = base + usize::from(fold_idx < extra);
        let end = start + size;
        folds.push(Fold {
            train: (0..start).chain(end..n).collect(),
            validation: (start..end).collect(),
        });
        start = end;
    }

    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10, 0.2, 42);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let split = train_test_split(11, 0.2, 42);
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_small_inputs() {
        let one = train_test_split(1, 0.2, 42);
        assert_eq!(one.train, vec![0]);
        assert!(one.test.is_empty());

        let two = train_test_split(2, 0.2, 42);
        assert_eq!(two.train.len(), 1);
        assert_eq!(two.test.len(), 1);
    }

    #[test]
    fn test_split_determinism() {
        assert_eq!(train_test_split(50, 0.2, 42), train_test_split(50, 0.2, 42));
        assert_ne!(train_test_split(50, 0.2, 42), train_test_split(50, 0.2, 7));
    }

    #[test]
    fn test_k_fold_shapes() {
        let folds = k_fold(12, 5).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.validation.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);

        assert_eq!(folds[0].validation, vec![0, 1, 2]);
        assert_eq!(folds[1].train[..3], [0, 1, 2]);
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.validation.len(), 12);
            assert!(fold.validation.iter().all(|i| !fold.train.contains(i)));
        }
    }

    #[test]
    fn test_k_fold_clamps_and_rejects() {
        assert_eq!(k_fold(3, 5).unwrap().len(), 3);
        assert!(k_fold(1, 5).is_err());
        assert!(k_fold(0, 5).is_err());
    }
}
