//! Threshold-sweep curves and the areas under them.
//!
//! A [`Curve`] is built from one sort of the supervised `(truth, confidence)`
//! pairs. It starts at an implicit threshold of `+inf` where nothing is
//! predicted positive, then lets every distinct confidence value cross in
//! turn, tied entries together. Each point carries the cut under which
//! exactly the crossed entries lie strictly above it: the next lower
//! distinct value, or `-inf` once every entry has crossed. Feeding a point's
//! threshold to [`binarize`](crate::core::matrix::binarize) reproduces its
//! counts.
//!
//! Areas use the trapezoidal rule over `(FPR, TPR)` for ROC and over
//! `(recall, precision)` for precision-recall. The start point's precision
//! is taken as 1. A label without positives (or, for ROC, without
//! negatives) has no meaningful curve and its area is NaN.

use crate::core::types::{Confidence, LabelValue};
use crate::metrics::{is_observed, mean};
use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Confusion counts at one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Entries with confidence strictly above this value are positive
    pub threshold: f64,
    /// True positives
    pub tp: usize,
    /// False positives
    pub fp: usize,
    /// False negatives
    pub fn_: usize,
    /// True negatives
    pub tn: usize,
}

impl CurvePoint {
    /// Precision; 1 when nothing is predicted positive.
    pub fn precision(&self) -> f64 {
        if self.tp + self.fp == 0 {
            1.0
        } else {
            self.tp as f64 / (self.tp + self.fp) as f64
        }
    }

    /// Recall, which is also the true positive rate.
    pub fn recall(&self) -> f64 {
        if self.tp + self.fn_ == 0 {
            f64::NAN
        } else {
            self.tp as f64 / (self.tp + self.fn_) as f64
        }
    }

    /// True positive rate.
    pub fn tpr(&self) -> f64 {
        self.recall()
    }

    /// False positive rate.
    pub fn fpr(&self) -> f64 {
        if self.fp + self.tn == 0 {
            f64::NAN
        } else {
            self.fp as f64 / (self.fp + self.tn) as f64
        }
    }

    /// Derived rates at this point.
    pub fn row(&self) -> CurveRow {
        CurveRow {
            threshold: self.threshold,
            precision: self.precision(),
            recall: self.recall(),
            tpr: self.tpr(),
            fpr: self.fpr(),
        }
    }
}

/// One plotted point of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CurveRow {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
    pub tpr: f64,
    pub fpr: f64,
}

/// Ordered threshold sweep for one binary problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<CurvePoint>,
    positives: usize,
    negatives: usize,
}

impl Curve {
    /// Build a curve from `(truth, confidence)` pairs. Missing truth is
    /// skipped.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (LabelValue, Confidence)>,
    {
        let mut scored: Vec<(Confidence, bool)> = pairs
            .into_iter()
            .filter(|&(y, _)| is_observed(y))
            .map(|(y, c)| (c, y == 1))
            .collect();
        if scored.is_empty() {
            return Self::default();
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let positives = scored.iter().filter(|(_, relevant)| *relevant).count();
        let negatives = scored.len() - positives;

        let mut points = Vec::with_capacity(scored.len() + 1);
        points.push(CurvePoint {
            threshold: f64::INFINITY,
            tp: 0,
            fp: 0,
            fn_: positives,
            tn: negatives,
        });

        let (mut tp, mut fp) = (0usize, 0usize);
        let mut i = 0;
        while i < scored.len() {
            let value = scored[i].0;
            while i < scored.len() && scored[i].0.total_cmp(&value).is_eq() {
                if scored[i].1 {
                    tp += 1;
                } else {
                    fp += 1;
                }
                i += 1;
            }
            let cut = scored.get(i).map_or(f64::NEG_INFINITY, |&(next, _)| next);
            points.push(CurvePoint {
                threshold: cut,
                tp,
                fp,
                fn_: positives - tp,
                tn: negatives - fp,
            });
        }

        Self {
            points,
            positives,
            negatives,
        }
    }

    /// Curve of one label column.
    pub fn for_label(
        truth: ArrayView2<'_, LabelValue>,
        confidences: ArrayView2<'_, Confidence>,
        label: usize,
    ) -> Self {
        let y = truth.column(label);
        let c = confidences.column(label);
        Self::from_pairs(y.iter().copied().zip(c.iter().copied()))
    }

    /// Pooled curve over every entry of the matrices.
    pub fn micro(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> Self {
        Self::from_pairs(truth.iter().copied().zip(confidences.iter().copied()))
    }

    /// Points in sweep order, starting at threshold `+inf`.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Derived `(threshold, precision, recall, TPR, FPR)` rows.
    pub fn rows(&self) -> Vec<CurveRow> {
        self.points.iter().map(CurvePoint::row).collect()
    }

    /// Number of supervised positives.
    pub fn positives(&self) -> usize {
        self.positives
    }

    /// Number of supervised negatives.
    pub fn negatives(&self) -> usize {
        self.negatives
    }

    /// Area under the ROC curve.
    pub fn auroc(&self) -> f64 {
        if self.positives == 0 || self.negatives == 0 {
            log::debug!(
                "degenerate ROC curve ({} positives, {} negatives)",
                self.positives,
                self.negatives
            );
            return f64::NAN;
        }
        trapezoid(self.points.iter().map(|p| (p.fpr(), p.tpr())))
    }

    /// Area under the precision-recall curve.
    pub fn auprc(&self) -> f64 {
        if self.positives == 0 {
            log::debug!("degenerate precision-recall curve (no positives)");
            return f64::NAN;
        }
        trapezoid(self.points.iter().map(|p| (p.recall(), p.precision())))
    }
}

/// Trapezoidal area under a polyline given in increasing `x` order.
fn trapezoid<I: IntoIterator<Item = (f64, f64)>>(points: I) -> f64 {
    let mut iter = points.into_iter();
    let Some((mut x0, mut y0)) = iter.next() else {
        return f64::NAN;
    };
    let mut area = 0.0;
    for (x1, y1) in iter {
        area += (x1 - x0) * (y0 + y1) / 2.0;
        x0 = x1;
        y0 = y1;
    }
    area
}

/// Per-label curves, optionally computed in parallel.
pub fn label_curves(
    truth: ArrayView2<'_, LabelValue>,
    confidences: ArrayView2<'_, Confidence>,
    parallel: bool,
) -> Vec<Curve> {
    let labels = truth.len_of(Axis(1));
    if parallel {
        (0..labels)
            .into_par_iter()
            .map(|j| Curve::for_label(truth, confidences, j))
            .collect()
    } else {
        (0..labels)
            .map(|j| Curve::for_label(truth, confidences, j))
            .collect()
    }
}

/// Calculate AUROC per label.
pub fn auroc_per_label(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>, parallel: bool) -> Vec<f64> {
    label_curves(truth, confidences, parallel).iter().map(Curve::auroc).collect()
}

/// Calculate AUPRC per label.
pub fn auprc_per_label(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>, parallel: bool) -> Vec<f64> {
    label_curves(truth, confidences, parallel).iter().map(Curve::auprc).collect()
}

/// Calculate macro-averaged AUROC. A degenerate label makes the average NaN.
pub fn auroc_macro(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>, parallel: bool) -> f64 {
    mean(auroc_per_label(truth, confidences, parallel))
}

/// Calculate macro-averaged AUPRC. A degenerate label makes the average NaN.
pub fn auprc_macro(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>, parallel: bool) -> f64 {
    mean(auprc_per_label(truth, confidences, parallel))
}

/// Calculate micro-averaged AUROC.
pub fn auroc_micro(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> f64 {
    Curve::micro(truth, confidences).auroc()
}

/// Calculate micro-averaged AUPRC.
pub fn auprc_micro(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> f64 {
    Curve::micro(truth, confidences).auprc()
}

/// Curve data reported at full verbosity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveSet {
    /// One curve per label
    pub per_label: Vec<Curve>,
    /// Pooled curve
    pub micro: Curve,
}

impl CurveSet {
    /// Build per-label and pooled curves.
    pub fn build(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>, parallel: bool) -> Self {
        Self {
            per_label: label_curves(truth, confidences, parallel),
            micro: Curve::micro(truth, confidences),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::{binarize, Threshold};
    use crate::metrics::ConfusionCounts;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn curve(y: &[LabelValue], c: &[Confidence]) -> Curve {
        Curve::from_pairs(y.iter().copied().zip(c.iter().copied()))
    }

    #[test]
    fn test_sweep_points() {
        let c = curve(&[1, 0, 1, 0], &[0.9, 0.8, 0.8, 0.1]);
        let points = c.points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].threshold, f64::INFINITY);
        assert_eq!((points[1].tp, points[1].fp), (1, 0));
        assert_eq!(points[1].threshold, 0.8);
        // the tie at 0.8 crosses as one step
        assert_eq!((points[2].tp, points[2].fp, points[2].threshold), (2, 1, 0.1));
        assert_eq!((points[3].tp, points[3].fp, points[3].tn), (2, 2, 0));
        assert_eq!(points[3].threshold, f64::NEG_INFINITY);
        assert_eq!(points[0].precision(), 1.0);
        assert_eq!(points[3].recall(), 1.0);
    }

    #[test]
    fn test_point_thresholds_reproduce_binarized_counts() {
        let truth = array![[1], [0], [1], [0], [1]];
        let confidences = array![[0.8], [0.3], [0.8], [0.5], [0.1]];
        let c = Curve::for_label(truth.view(), confidences.view(), 0);
        assert_eq!(c.points().len(), 5);

        for point in c.points() {
            let predicted = binarize(confidences.view(), &Threshold::Global(point.threshold)).unwrap();
            let counts = ConfusionCounts::from_views(truth.column(0), predicted.column(0));
            assert_eq!(
                (counts.tp, counts.fp, counts.fn_, counts.tn),
                (point.tp, point.fp, point.fn_, point.tn),
                "threshold {}",
                point.threshold
            );
        }

        let pair = curve(&[1, 0], &[0.8, 0.3]);
        assert_eq!((pair.points()[1].threshold, pair.points()[1].tp), (0.3, 1));
    }

    #[test]
    fn test_perfect_separation() {
        let c = curve(&[1, 1, 0, 0], &[0.9, 0.7, 0.4, 0.2]);
        assert_abs_diff_eq!(c.auroc(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.auprc(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_separation() {
        let c = curve(&[0, 0, 1, 1], &[0.9, 0.7, 0.4, 0.2]);
        assert_abs_diff_eq!(c.auroc(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ties_give_half_credit() {
        let c = curve(&[1, 0], &[0.5, 0.5]);
        assert_abs_diff_eq!(c.auroc(), 0.5, epsilon = 1e-12);
        // (0,1) -> (1,0.5)
        assert_abs_diff_eq!(c.auprc(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_auroc_matches_pair_counting() {
        let y = [1, 0, 1, 1, 0, 0, 1, 0];
        let s = [0.8, 0.7, 0.6, 0.3, 0.3, 0.2, 0.9, 0.5];
        let mut wins = 0.0;
        let mut pairs = 0.0;
        for i in 0..y.len() {
            for j in 0..y.len() {
                if y[i] == 1 && y[j] == 0 {
                    pairs += 1.0;
                    if s[i] > s[j] {
                        wins += 1.0;
                    } else if s[i] == s[j] {
                        wins += 0.5;
                    }
                }
            }
        }
        assert_abs_diff_eq!(curve(&y, &s).auroc(), wins / pairs, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_labels() {
        let no_positives = curve(&[0, 0, 0], &[0.1, 0.2, 0.3]);
        assert!(no_positives.auroc().is_nan());
        assert!(no_positives.auprc().is_nan());

        let no_negatives = curve(&[1, 1], &[0.1, 0.2]);
        assert!(no_negatives.auroc().is_nan());
        assert_abs_diff_eq!(no_negatives.auprc(), 1.0, epsilon = 1e-12);

        assert!(curve(&[-1, -1], &[0.1, 0.2]).auroc().is_nan());
    }

    #[test]
    fn test_macro_and_micro() {
        let truth = array![[1, 0], [0, 1], [1, 0], [0, 0]];
        let confidences = array![[0.9, 0.2], [0.1, 0.8], [0.7, 0.3], [0.2, 0.1]];
        assert_abs_diff_eq!(auroc_macro(truth.view(), confidences.view(), false), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(auroc_macro(truth.view(), confidences.view(), true), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(auroc_micro(truth.view(), confidences.view()), 1.0, epsilon = 1e-12);

        let degenerate = array![[1, 0], [0, 0]];
        let scores = array![[0.9, 0.2], [0.1, 0.8]];
        assert!(auroc_macro(degenerate.view(), scores.view(), false).is_nan());
        assert!(!auroc_micro(degenerate.view(), scores.view()).is_nan());
    }

    #[test]
    fn test_curve_set() {
        let truth = array![[1, 0], [0, 1]];
        let confidences = array![[0.9, 0.2], [0.1, 0.8]];
        let set = CurveSet::build(truth.view(), confidences.view(), false);
        assert_eq!(set.per_label.len(), 2);
        assert_eq!(set.micro.positives(), 2);
        assert_eq!(set.micro.negatives(), 2);
        let rows = set.micro.rows();
        assert_eq!(rows.first().map(|r| r.recall), Some(0.0));
        assert_eq!(rows.last().map(|r| r.fpr), Some(1.0));
    }
}
