//! Confusion counts and the precision/recall/F1 family.
//!
//! Micro averages pool the counts of every supervised entry before dividing.
//! Macro averages compute the measure per label and average the labels that
//! have at least one supervised entry.

use crate::core::types::LabelValue;
use crate::metrics::{is_observed, mean_of_defined};
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// True/false positive/negative counts over supervised entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Predicted 1, truth 1
    pub tp: usize,
    /// Predicted 1, truth 0
    pub fp: usize,
    /// Predicted 0, truth 1
    pub fn_: usize,
    /// Predicted 0, truth 0
    pub tn: usize,
}

impl ConfusionCounts {
    /// Count one truth/prediction pair. Missing truth is ignored.
    #[inline]
    pub fn add(&mut self, truth: LabelValue, predicted: LabelValue) {
        if !is_observed(truth) {
            return;
        }
        match (truth == 1, predicted == 1) {
            (true, true) => self.tp += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
            (false, false) => self.tn += 1,
        }
    }

    /// Count aligned truth and prediction vectors.
    pub fn from_views(truth: ArrayView1<'_, LabelValue>, predicted: ArrayView1<'_, LabelValue>) -> Self {
        let mut counts = Self::default();
        for (&y, &p) in truth.iter().zip(predicted.iter()) {
            counts.add(y, p);
        }
        counts
    }

    /// Sum two sets of counts.
    pub fn merge(self, other: Self) -> Self {
        Self {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
            tn: self.tn + other.tn,
        }
    }

    /// Number of supervised entries counted.
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    /// Calculate precision; 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        if self.total() == 0 {
            return f64::NAN;
        }
        ratio_or_zero(self.tp, self.tp + self.fp)
    }

    /// Calculate recall; 0 when there are no positives.
    pub fn recall(&self) -> f64 {
        if self.total() == 0 {
            return f64::NAN;
        }
        ratio_or_zero(self.tp, self.tp + self.fn_)
    }

    /// Calculate F1 score; 0 when precision and recall are both 0.
    pub fn f1(&self) -> f64 {
        f1_score(self.precision(), self.recall())
    }
}

#[inline]
fn ratio_or_zero(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Harmonic mean of precision and recall.
#[inline]
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision.is_nan() || recall.is_nan() {
        return f64::NAN;
    }
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Counts for every label column.
pub fn label_counts(
    truth: ArrayView2<'_, LabelValue>,
    predicted: ArrayView2<'_, LabelValue>,
) -> Vec<ConfusionCounts> {
    truth
        .axis_iter(Axis(1))
        .zip(predicted.axis_iter(Axis(1)))
        .map(|(y, p)| ConfusionCounts::from_views(y, p))
        .collect()
}

/// Counts pooled over every supervised entry.
pub fn micro_counts(
    truth: ArrayView2<'_, LabelValue>,
    predicted: ArrayView2<'_, LabelValue>,
) -> ConfusionCounts {
    label_counts(truth, predicted)
        .into_iter()
        .fold(ConfusionCounts::default(), ConfusionCounts::merge)
}

/// Calculate micro-averaged precision.
pub fn precision_micro(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    micro_counts(truth, predicted).precision()
}

/// Calculate micro-averaged recall.
pub fn recall_micro(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    micro_counts(truth, predicted).recall()
}

/// Calculate micro-averaged F1.
pub fn f1_micro(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    micro_counts(truth, predicted).f1()
}

/// Precision per label; NaN for a fully unsupervised label.
pub fn precision_per_label(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> Vec<f64> {
    label_counts(truth, predicted).iter().map(ConfusionCounts::precision).collect()
}

/// Recall per label; NaN for a fully unsupervised label.
pub fn recall_per_label(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> Vec<f64> {
    label_counts(truth, predicted).iter().map(ConfusionCounts::recall).collect()
}

/// F1 per label; NaN for a fully unsupervised label.
pub fn f1_per_label(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> Vec<f64> {
    label_counts(truth, predicted).iter().map(ConfusionCounts::f1).collect()
}

/// Calculate macro-averaged precision.
pub fn precision_macro(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    mean_of_defined(precision_per_label(truth, predicted))
}

/// Calculate macro-averaged recall.
pub fn recall_macro(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    mean_of_defined(recall_per_label(truth, predicted))
}

/// Calculate F1 averaged over labels.
pub fn f1_macro_by_label(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    mean_of_defined(f1_per_label(truth, predicted))
}
