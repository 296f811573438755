//! Common fixtures for multilabel-eval integration tests.
#![allow(dead_code)]

use multilabel_eval::*;
use ndarray::Array2;
use rand::prelude::*;

/// Random binary truth matrix with the given positive rate.
pub fn random_truth(num_instances: usize, num_labels: usize, positive_rate: f64, seed: u64) -> Array2<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((num_instances, num_labels), |_| i32::from(rng.gen_bool(positive_rate)))
}

/// Uniform random confidences in `[0, 1)`.
pub fn random_confidences(num_instances: usize, num_labels: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((num_instances, num_labels), |_| rng.gen::<f64>())
}

/// Confidences that lean toward the truth: positives in `[0.5 - overlap, 1)`,
/// negatives in `[0, 0.5 + overlap)`.
pub fn informative_confidences(truth: &Array2<i32>, overlap: f64, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    truth.mapv(|y| {
        if y == 1 {
            rng.gen_range((0.5 - overlap)..1.0)
        } else {
            rng.gen_range(0.0..(0.5 + overlap))
        }
    })
}

/// Replace a random fraction of entries with the missing sentinel.
pub fn with_missing(truth: &Array2<i32>, missing_rate: f64, seed: u64) -> Array2<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    truth.mapv(|y| if rng.gen_bool(missing_rate) { MISSING } else { y })
}

/// Confidences that reproduce the truth exactly: 1.0 for positives, 0.0 for
/// negatives.
pub fn perfect_confidences(truth: &Array2<i32>) -> Array2<f64> {
    truth.mapv(|y| if y == 1 { 1.0 } else { 0.0 })
}

/// Configuration with a fixed global threshold.
pub fn fixed_config(threshold: f64, verbosity: Verbosity) -> EvalConfig {
    EvalConfigBuilder::new()
        .threshold(ThresholdSpec::Fixed(threshold))
        .verbosity(verbosity)
        .build()
        .unwrap()
}

/// Build and finalize a result from matrices.
pub fn finalized(truth: &Array2<i32>, confidences: &Array2<f64>, config: EvalConfig) -> EvalResult {
    let truth = LabelMatrix::new(truth.clone()).unwrap();
    let confidences = ConfidenceMatrix::new(confidences.clone());
    let mut result = EvalResult::from_matrices(&truth, &confidences, config).unwrap();
    result.finalize().unwrap();
    result
}
