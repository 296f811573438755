//! Set-based metrics computed per instance and averaged over instances.
//!
//! An instance whose truth row is entirely missing takes no part in the
//! average. The comparisons here use plain value equality, so the
//! exact-match and Hamming family also serve multi-target class vectors.

use crate::core::types::LabelValue;
use crate::metrics::confusion::ConfusionCounts;
use crate::metrics::{is_observed, mean_of_defined};
use ndarray::{ArrayView1, ArrayView2, Axis};

fn per_instance<F>(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>, f: F) -> f64
where
    F: Fn(ArrayView1<'_, LabelValue>, ArrayView1<'_, LabelValue>) -> f64,
{
    mean_of_defined(
        truth
            .axis_iter(Axis(0))
            .zip(predicted.axis_iter(Axis(0)))
            .map(|(y, p)| f(y, p)),
    )
}

/// Supervised positions of one instance as `(truth, predicted)` pairs.
///
/// Both views share one lifetime, so callers pass fresh reborrows.
fn observed_pairs<'a>(
    truth: ArrayView1<'a, LabelValue>,
    predicted: ArrayView1<'a, LabelValue>,
) -> impl Iterator<Item = (LabelValue, LabelValue)> + 'a {
    truth
        .into_iter()
        .zip(predicted)
        .filter(|&(&y, _)| is_observed(y))
        .map(|(&y, &p)| (y, p))
}

/// 0/1 loss of one instance; NaN when nothing is supervised.
pub fn zero_one_loss_instance(truth: ArrayView1<'_, LabelValue>, predicted: ArrayView1<'_, LabelValue>) -> f64 {
    let mut observed = 0usize;
    let mut any_mismatch = false;
    for (y, p) in observed_pairs(truth.view(), predicted.view()) {
        observed += 1;
        any_mismatch |= y != p;
    }
    match (observed, any_mismatch) {
        (0, _) => f64::NAN,
        (_, true) => 1.0,
        (_, false) => 0.0,
    }
}

/// Calculate 0/1 loss.
pub fn zero_one_loss(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    per_instance(truth, predicted, zero_one_loss_instance)
}

/// Calculate exact match, the complement of 0/1 loss.
pub fn exact_match(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    1.0 - zero_one_loss(truth, predicted)
}

/// Hamming loss of one instance; NaN when nothing is supervised.
pub fn hamming_loss_instance(truth: ArrayView1<'_, LabelValue>, predicted: ArrayView1<'_, LabelValue>) -> f64 {
    let (observed, mismatched) = observed_pairs(truth.view(), predicted.view())
        .fold((0usize, 0usize), |(n, m), (y, p)| (n + 1, m + usize::from(y != p)));
    if observed == 0 {
        f64::NAN
    } else {
        mismatched as f64 / observed as f64
    }
}

/// Calculate Hamming loss.
pub fn hamming_loss(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    per_instance(truth, predicted, hamming_loss_instance)
}

/// Calculate Hamming score, the complement of Hamming loss.
pub fn hamming_score(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    1.0 - hamming_loss(truth, predicted)
}

/// Fraction of correct supervised entries per label column.
pub fn hamming_score_per_label(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> Vec<f64> {
    truth
        .axis_iter(Axis(1))
        .zip(predicted.axis_iter(Axis(1)))
        .map(|(y, p)| 1.0 - hamming_loss_instance(y, p))
        .collect()
}

/// Jaccard index of one instance. Two empty label sets agree vacuously.
pub fn jaccard_index_instance(truth: ArrayView1<'_, LabelValue>, predicted: ArrayView1<'_, LabelValue>) -> f64 {
    let mut observed = 0usize;
    let mut intersection = 0usize;
    let mut union = 0usize;
    for (y, p) in observed_pairs(truth.view(), predicted.view()) {
        observed += 1;
        let (y, p) = (y == 1, p == 1);
        intersection += usize::from(y && p);
        union += usize::from(y || p);
    }
    if observed == 0 {
        f64::NAN
    } else if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Calculate the Jaccard index (multi-label accuracy).
pub fn jaccard_index(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    per_instance(truth, predicted, jaccard_index_instance)
}

/// Calculate the Jaccard distance.
pub fn jaccard_distance(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    1.0 - jaccard_index(truth, predicted)
}

/// Harmonic mean of the accuracies on the negative and positive labels of
/// one instance. NaN unless both groups are present.
pub fn harmonic_accuracy_instance(truth: ArrayView1<'_, LabelValue>, predicted: ArrayView1<'_, LabelValue>) -> f64 {
    let counts = ConfusionCounts::from_views(truth, predicted);
    let negatives = counts.tn + counts.fp;
    let positives = counts.tp + counts.fn_;
    if negatives == 0 || positives == 0 {
        return f64::NAN;
    }
    let acc0 = counts.tn as f64 / negatives as f64;
    let acc1 = counts.tp as f64 / positives as f64;
    if acc0 + acc1 == 0.0 {
        0.0
    } else {
        2.0 * acc0 * acc1 / (acc0 + acc1)
    }
}

/// Calculate harmonic accuracy, averaged over instances where it is defined.
pub fn harmonic_accuracy(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    per_instance(truth, predicted, harmonic_accuracy_instance)
}

/// Calculate F1 averaged over instances.
pub fn f1_macro_by_instance(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    per_instance(truth, predicted, |y, p| ConfusionCounts::from_views(y, p).f1())
}
