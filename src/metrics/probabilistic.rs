//! Bounded log loss.
//!
//! Each supervised (instance, label) pair contributes
//! `min(C, -(y ln p + (1 - y) ln(1 - p)))`, zero when `p` equals `y`
//! exactly, and zero when the logarithms produce NaN. The ceiling `C` is
//! `ln L` or `ln N` depending on the variant.

use crate::core::types::{Confidence, LabelValue};
use crate::metrics::is_observed;
use ndarray::ArrayView2;

/// Loss of one pair under ceiling `ceiling`.
#[inline]
pub fn bounded_log_loss(truth: LabelValue, confidence: Confidence, ceiling: f64) -> f64 {
    let y = f64::from(truth);
    if y == confidence {
        return 0.0;
    }
    let raw = -(y * confidence.ln() + (1.0 - y) * (1.0 - confidence).ln());
    if raw.is_nan() {
        0.0
    } else {
        raw.min(ceiling)
    }
}

/// Mean bounded log loss over supervised pairs; NaN when none exist.
pub fn log_loss(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>, ceiling: f64) -> f64 {
    let (sum, count) = truth
        .iter()
        .zip(confidences.iter())
        .filter(|&(&y, _)| is_observed(y))
        .fold((0.0, 0usize), |(s, n), (&y, &p)| (s + bounded_log_loss(y, p, ceiling), n + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Log loss bounded by `ln L`.
pub fn log_loss_max_labels(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> f64 {
    log_loss(truth, confidences, (truth.ncols() as f64).ln())
}

/// Log loss bounded by `ln N`.
pub fn log_loss_max_instances(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> f64 {
    log_loss(truth, confidences, (truth.nrows() as f64).ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pair_loss() {
        assert_eq!(bounded_log_loss(1, 1.0, 2.0), 0.0);
        assert_eq!(bounded_log_loss(0, 0.0, 2.0), 0.0);
        assert_abs_diff_eq!(bounded_log_loss(1, 0.5, 2.0), std::f64::consts::LN_2, epsilon = 1e-12);
        // ln(0) is capped
        assert_eq!(bounded_log_loss(1, 0.0, 2.0), 2.0);
        assert_eq!(bounded_log_loss(0, 1.0, 2.0), 2.0);
    }

    #[test]
    fn test_nan_becomes_zero() {
        assert_eq!(bounded_log_loss(0, f64::NAN, 2.0), 0.0);
        assert_eq!(bounded_log_loss(1, -0.5, 2.0), 0.0);
    }

    #[test]
    fn test_inverted_is_ln_labels() {
        let y = array![[0, 1, 0], [1, 0, 1], [0, 1, 0], [1, 0, 1]];
        let p = y.mapv(|v| f64::from(1 - v));
        assert_abs_diff_eq!(log_loss_max_labels(y.view(), p.view()), 3.0_f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(log_loss_max_instances(y.view(), p.view()), 4.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_missing_pairs_are_excluded() {
        let y = array![[1, -1], [0, -1]];
        let p = array![[1.0, 0.3], [0.0, 0.9]];
        assert_eq!(log_loss_max_labels(y.view(), p.view()), 0.0);

        let all_missing = array![[-1, -1]];
        assert!(log_loss_max_labels(all_missing.view(), p.slice(ndarray::s![0..1, ..])).is_nan());
    }
}
