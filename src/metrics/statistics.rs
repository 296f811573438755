//! Label statistics of truth and prediction matrices.
//!
//! Only supervised positions are counted, and instances without any
//! supervised position are left out, so that true and predicted figures
//! stay comparable when labels are missing.

use crate::core::error::{EvalError, Result};
use crate::core::matrix::LabelMatrix;
use crate::core::types::LabelValue;
use crate::metrics::{is_observed, mean_of_defined};
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

fn positives_at_observed(truth: ArrayView1<'_, LabelValue>, values: ArrayView1<'_, LabelValue>) -> Option<usize> {
    let mut observed = false;
    let mut positives = 0usize;
    for (&y, &v) in truth.iter().zip(values.iter()) {
        if is_observed(y) {
            observed = true;
            positives += usize::from(v == 1);
        }
    }
    observed.then_some(positives)
}

/// Calculate the mean number of positive labels per instance.
pub fn label_cardinality(truth: ArrayView2<'_, LabelValue>) -> f64 {
    predicted_cardinality(truth, truth)
}

/// Calculate the mean number of predicted labels per instance.
pub fn predicted_cardinality(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    mean_of_defined(
        truth
            .axis_iter(Axis(0))
            .zip(predicted.axis_iter(Axis(0)))
            .map(|(y, p)| positives_at_observed(y, p).map_or(f64::NAN, |n| n as f64)),
    )
}

/// Calculate the fraction of instances with no predicted label.
pub fn empty_prediction_ratio(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    mean_of_defined(
        truth
            .axis_iter(Axis(0))
            .zip(predicted.axis_iter(Axis(0)))
            .map(|(y, p)| match positives_at_observed(y, p) {
                None => f64::NAN,
                Some(0) => 1.0,
                Some(_) => 0.0,
            }),
    )
}

/// Fraction of positive entries per label; NaN for an unsupervised label.
pub fn label_frequencies(truth: ArrayView2<'_, LabelValue>) -> Vec<f64> {
    truth
        .axis_iter(Axis(1))
        .map(|column| {
            let (observed, positives) = column
                .iter()
                .filter(|&&y| is_observed(y))
                .fold((0usize, 0usize), |(n, k), &y| (n + 1, k + usize::from(y == 1)));
            if observed == 0 {
                f64::NAN
            } else {
                positives as f64 / observed as f64
            }
        })
        .collect()
}

/// Label statistics a proportional cut aims to reproduce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTarget {
    /// Mean positive labels per instance
    pub cardinality: f64,
    /// Positive rate of each label
    pub per_label: Vec<f64>,
}

impl CalibrationTarget {
    /// Derive the target from a training truth matrix.
    pub fn from_truth(truth: &LabelMatrix) -> Result<Self> {
        truth.ensure_binary()?;
        let cardinality = label_cardinality(truth.view());
        if cardinality.is_nan() {
            return Err(EvalError::calibration(
                "training labels contain no supervised entry",
            ));
        }
        Ok(Self {
            cardinality,
            per_label: label_frequencies(truth.view()),
        })
    }

    /// Number of labels covered by the per-label targets.
    pub fn num_labels(&self) -> usize {
        self.per_label.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_cardinality_and_frequencies() {
        let truth = array![[1, 0, 1], [0, 0, 1], [1, 1, 1], [0, 0, 0]];
        assert_abs_diff_eq!(label_cardinality(truth.view()), 1.5, epsilon = 1e-12);
        assert_eq!(label_frequencies(truth.view()), vec![0.5, 0.25, 0.75]);
    }

    #[test]
    fn test_predicted_statistics() {
        let truth = array![[1, 0], [0, 1], [0, 0]];
        let predicted = array![[1, 1], [0, 0], [0, 1]];
        assert_abs_diff_eq!(predicted_cardinality(truth.view(), predicted.view()), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(empty_prediction_ratio(truth.view(), predicted.view()), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_handling() {
        let truth = array![[1, -1], [-1, -1]];
        assert_eq!(label_cardinality(truth.view()), 1.0);
        let frequencies = label_frequencies(truth.view());
        assert_eq!(frequencies[0], 1.0);
        assert!(frequencies[1].is_nan());

        let nothing = array![[-1, -1]];
        assert!(label_cardinality(nothing.view()).is_nan());
        assert!(empty_prediction_ratio(nothing.view(), array![[0, 0]].view()).is_nan());
    }

    #[test]
    fn test_calibration_target() {
        let truth = LabelMatrix::from_rows(&[vec![1, 0, 1], vec![0, 1, 0]]).unwrap();
        let target = CalibrationTarget::from_truth(&truth).unwrap();
        assert_abs_diff_eq!(target.cardinality, 1.5, epsilon = 1e-12);
        assert_eq!(target.num_labels(), 3);

        let unsupervised = LabelMatrix::from_rows(&[vec![-1, -1]]).unwrap();
        assert!(CalibrationTarget::from_truth(&unsupervised).is_err());

        let multi_target = LabelMatrix::from_rows(&[vec![2, 0]]).unwrap();
        assert!(CalibrationTarget::from_truth(&multi_target).is_err());
    }
}
