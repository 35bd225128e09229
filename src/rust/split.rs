use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seed shared by every training routine so retraining on the same data is reproducible.
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of rows held out for evaluation.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits row indices into train and test sets while keeping the class
/// proportions of `labels` in both halves.
///
/// Every class keeps at least one training row, so a class seen once in the
/// data always ends up in the training half. Output indices are shuffled with
/// the given seed.
pub fn stratified_split(labels: &[usize], test_size: f64, seed: u64) -> TrainTestSplit {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(row);
    }

    let test_size = test_size.clamp(0.0, 1.0);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::with_capacity((labels.len() as f64 * test_size).ceil() as usize);

    for rows in by_class.values_mut() {
        rows.shuffle(&mut rng);
        let wanted = (rows.len() as f64 * test_size).round() as usize;
        let n_test = wanted.min(rows.len().saturating_sub(1));
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    TrainTestSplit { train, test }
}

/// Fraction of positions where `predicted` equals `expected`. Empty input scores 0.
pub fn accuracy(expected: &[usize], predicted: &[usize]) -> f64 {
    let n = expected.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let hits = expected
        .iter()
        .zip(predicted)
        .filter(|(a, b)| a == b)
        .count();
    hits as f64 / n as f64
}
