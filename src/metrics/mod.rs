//! Evaluation metrics for multi-label and multi-target predictions.
//!
//! Every metric is a pure function over an [`EvalContext`], the read-only
//! snapshot of one run's truth, confidence and binarized prediction
//! matrices. The [`MetricRegistry`] maps stable metric names to those
//! functions so that a run can evaluate a whole battery in one pass, in
//! parallel if requested.
//!
//! # Missing values
//!
//! A truth entry equal to [`MISSING`] contributes to neither numerator nor
//! denominator of any ratio. A metric whose scope contains no supervised
//! entry at all is NaN.
//!
//! # Example
//!
//! ```rust
//! use multilabel_eval::metrics::{names, EvalContext, MetricRegistry};
//! use multilabel_eval::{TaskKind, Verbosity};
//! use ndarray::array;
//!
//! let truth = array![[1, 0, 1], [0, 1, 0]];
//! let confidences = array![[0.9, 0.2, 0.7], [0.1, 0.8, 0.4]];
//! let predicted = array![[1, 0, 1], [0, 1, 0]];
//!
//! let ctx = EvalContext::new(truth.view(), confidences.view(), predicted.view())?;
//! let values = MetricRegistry::standard().evaluate(&ctx, Verbosity::Standard, TaskKind::MultiLabel);
//! assert_eq!(values[names::EXACT_MATCH], 1.0);
//! # Ok::<(), multilabel_eval::EvalError>(())
//! ```

pub mod confusion;
pub mod curve;
pub mod probabilistic;
pub mod ranking;
pub mod sequence;
pub mod set_based;
pub mod statistics;

pub use confusion::ConfusionCounts;
pub use curve::{Curve, CurvePoint, CurveRow, CurveSet};

use crate::core::constants::MISSING;
use crate::core::error::{EvalError, Result};
use crate::core::matrix::ensure_same_shape;
use crate::core::types::*;
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Stable metric names used as keys in result maps.
#[allow(missing_docs)]
pub mod names {
    pub const EXACT_MATCH: &str = "exact_match";
    pub const ZERO_ONE_LOSS: &str = "zero_one_loss";
    pub const HAMMING_SCORE: &str = "hamming_score";
    pub const HAMMING_LOSS: &str = "hamming_loss";
    pub const JACCARD_INDEX: &str = "jaccard_index";
    pub const JACCARD_DISTANCE: &str = "jaccard_distance";
    pub const HARMONIC_ACCURACY: &str = "harmonic_accuracy";
    pub const F1_MACRO_BY_INSTANCE: &str = "f1_macro_by_instance";
    pub const F1_MACRO_BY_LABEL: &str = "f1_macro_by_label";
    pub const F1_MICRO: &str = "f1_micro";
    pub const PRECISION_MACRO: &str = "precision_macro";
    pub const PRECISION_MICRO: &str = "precision_micro";
    pub const RECALL_MACRO: &str = "recall_macro";
    pub const RECALL_MICRO: &str = "recall_micro";
    pub const ONE_ERROR: &str = "one_error";
    pub const AVERAGE_PRECISION: &str = "average_precision";
    pub const RANK_LOSS: &str = "rank_loss";
    pub const LOG_LOSS_MAX_LABELS: &str = "log_loss_max_labels";
    pub const LOG_LOSS_MAX_INSTANCES: &str = "log_loss_max_instances";
    pub const AUROC_MACRO: &str = "auroc_macro";
    pub const AUPRC_MACRO: &str = "auprc_macro";
    pub const AUROC_MICRO: &str = "auroc_micro";
    pub const AUPRC_MICRO: &str = "auprc_micro";
    pub const LEVENSHTEIN_DISTANCE: &str = "levenshtein_distance";
    pub const LABEL_CARDINALITY_TRUE: &str = "label_cardinality_true";
    pub const LABEL_CARDINALITY_PREDICTED: &str = "label_cardinality_predicted";
    pub const EMPTY_PREDICTION_RATIO: &str = "empty_prediction_ratio";

    pub const HAMMING_SCORE_PER_LABEL: &str = "hamming_score_per_label";
    pub const PRECISION_PER_LABEL: &str = "precision_per_label";
    pub const RECALL_PER_LABEL: &str = "recall_per_label";
    pub const F1_PER_LABEL: &str = "f1_per_label";
    pub const AUROC_PER_LABEL: &str = "auroc_per_label";
    pub const AUPRC_PER_LABEL: &str = "auprc_per_label";
    pub const THRESHOLD_PER_LABEL: &str = "threshold_per_label";
}

/// Read-only inputs shared by every metric of one run.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    truth: ArrayView2<'a, LabelValue>,
    confidences: ArrayView2<'a, Confidence>,
    predictions: ArrayView2<'a, LabelValue>,
    parallel: bool,
}

impl<'a> EvalContext<'a> {
    /// Build a context; all three matrices must be `N x L`.
    pub fn new(
        truth: ArrayView2<'a, LabelValue>,
        confidences: ArrayView2<'a, Confidence>,
        predictions: ArrayView2<'a, LabelValue>,
    ) -> Result<Self> {
        ensure_same_shape(truth, confidences)?;
        ensure_same_shape(truth, predictions)?;
        Ok(Self {
            truth,
            confidences,
            predictions,
            parallel: false,
        })
    }

    /// Allow metrics to fan out per label.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Truth matrix
    pub fn truth(&self) -> ArrayView2<'a, LabelValue> {
        self.truth
    }

    /// Confidence matrix
    pub fn confidences(&self) -> ArrayView2<'a, Confidence> {
        self.confidences
    }

    /// Binarized (or rounded multi-target) prediction matrix
    pub fn predictions(&self) -> ArrayView2<'a, LabelValue> {
        self.predictions
    }

    /// Whether per-label work may run in parallel
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Number of instances
    pub fn num_instances(&self) -> usize {
        self.truth.nrows()
    }

    /// Number of labels
    pub fn num_labels(&self) -> usize {
        self.truth.ncols()
    }
}

/// Scalar metric function.
pub type MetricFn = fn(&EvalContext<'_>) -> f64;

/// Per-label metric function.
pub type VectorMetricFn = fn(&EvalContext<'_>) -> Vec<f64>;

const MULTI_LABEL: &[TaskKind] = &[TaskKind::MultiLabel];
const ALL_TASKS: &[TaskKind] = &[TaskKind::MultiLabel, TaskKind::MultiTarget];

/// A registered scalar metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    /// Key in the metric map
    pub name: &'static str,
    /// Whether lower or higher is better
    pub direction: MetricDirection,
    /// Lowest verbosity that computes this metric
    pub level: Verbosity,
    /// Tasks the metric applies to
    pub tasks: &'static [TaskKind],
    /// The metric function
    pub compute: MetricFn,
}

impl MetricSpec {
    /// Whether this metric is computed for the given verbosity and task.
    pub fn applies(&self, verbosity: Verbosity, task: TaskKind) -> bool {
        self.level <= verbosity && self.tasks.contains(&task)
    }
}

/// A registered per-label metric.
#[derive(Debug, Clone, Copy)]
pub struct VectorMetricSpec {
    /// Key in the vector map
    pub name: &'static str,
    /// Lowest verbosity that computes this metric
    pub level: Verbosity,
    /// Tasks the metric applies to
    pub tasks: &'static [TaskKind],
    /// The metric function
    pub compute: VectorMetricFn,
}

impl VectorMetricSpec {
    /// Whether this metric is computed for the given verbosity and task.
    pub fn applies(&self, verbosity: Verbosity, task: TaskKind) -> bool {
        self.level <= verbosity && self.tasks.contains(&task)
    }
}

/// Table of metric name → metric function.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    scalars: Vec<MetricSpec>,
    vectors: Vec<VectorMetricSpec>,
}

impl MetricRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scalar metric; names must be unique.
    pub fn register(&mut self, spec: MetricSpec) -> Result<()> {
        if self.contains(spec.name) {
            return Err(EvalError::config(format!(
                "metric '{}' is already registered",
                spec.name
            )));
        }
        self.scalars.push(spec);
        Ok(())
    }

    /// Register a per-label metric; names must be unique.
    pub fn register_vector(&mut self, spec: VectorMetricSpec) -> Result<()> {
        if self.contains(spec.name) {
            return Err(EvalError::config(format!(
                "metric '{}' is already registered",
                spec.name
            )));
        }
        self.vectors.push(spec);
        Ok(())
    }

    /// Whether a scalar or vector metric with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.scalars.iter().any(|s| s.name == name) || self.vectors.iter().any(|s| s.name == name)
    }

    /// Look up a scalar metric.
    pub fn get(&self, name: &str) -> Option<&MetricSpec> {
        self.scalars.iter().find(|s| s.name == name)
    }

    /// Look up a per-label metric.
    pub fn get_vector(&self, name: &str) -> Option<&VectorMetricSpec> {
        self.vectors.iter().find(|s| s.name == name)
    }

    /// Names of all scalar metrics, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.scalars.iter().map(|s| s.name).collect()
    }

    /// Scalar metrics computed at the given verbosity for the given task.
    pub fn select(&self, verbosity: Verbosity, task: TaskKind) -> Vec<&MetricSpec> {
        self.scalars
            .iter()
            .filter(|s| s.applies(verbosity, task))
            .collect()
    }

    /// Evaluate every applicable scalar metric.
    pub fn evaluate(
        &self,
        ctx: &EvalContext<'_>,
        verbosity: Verbosity,
        task: TaskKind,
    ) -> BTreeMap<String, f64> {
        let selected = self.select(verbosity, task);
        if ctx.parallel() {
            selected
                .par_iter()
                .map(|spec| (spec.name.to_string(), (spec.compute)(ctx)))
                .collect()
        } else {
            selected
                .iter()
                .map(|spec| (spec.name.to_string(), (spec.compute)(ctx)))
                .collect()
        }
    }

    /// Evaluate every applicable per-label metric.
    pub fn evaluate_vectors(
        &self,
        ctx: &EvalContext<'_>,
        verbosity: Verbosity,
        task: TaskKind,
    ) -> BTreeMap<String, Vec<f64>> {
        let selected: Vec<&VectorMetricSpec> = self
            .vectors
            .iter()
            .filter(|s| s.applies(verbosity, task))
            .collect();
        if ctx.parallel() {
            selected
                .par_iter()
                .map(|spec| (spec.name.to_string(), (spec.compute)(ctx)))
                .collect()
        } else {
            selected
                .iter()
                .map(|spec| (spec.name.to_string(), (spec.compute)(ctx)))
                .collect()
        }
    }

    /// Registry holding every metric this crate implements.
    pub fn standard() -> Self {
        use MetricDirection::{Maximize, Minimize};
        use Verbosity::{Minimal, PerLabel, Standard};

        let scalar = |name: &'static str,
                      direction: MetricDirection,
                      level: Verbosity,
                      tasks: &'static [TaskKind],
                      compute: MetricFn| MetricSpec {
            name,
            direction,
            level,
            tasks,
            compute,
        };
        let scalars = vec![
            scalar(names::EXACT_MATCH, Maximize, Minimal, ALL_TASKS, |c: &EvalContext<'_>| {
                set_based::exact_match(c.truth(), c.predictions())
            }),
            scalar(names::ZERO_ONE_LOSS, Minimize, Standard, ALL_TASKS, |c: &EvalContext<'_>| {
                set_based::zero_one_loss(c.truth(), c.predictions())
            }),
            scalar(names::HAMMING_SCORE, Maximize, Minimal, ALL_TASKS, |c: &EvalContext<'_>| {
                set_based::hamming_score(c.truth(), c.predictions())
            }),
            scalar(names::HAMMING_LOSS, Minimize, Standard, ALL_TASKS, |c: &EvalContext<'_>| {
                set_based::hamming_loss(c.truth(), c.predictions())
            }),
            scalar(names::JACCARD_INDEX, Maximize, Minimal, MULTI_LABEL, |c: &EvalContext<'_>| {
                set_based::jaccard_index(c.truth(), c.predictions())
            }),
            scalar(names::JACCARD_DISTANCE, Minimize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                set_based::jaccard_distance(c.truth(), c.predictions())
            }),
            scalar(names::HARMONIC_ACCURACY, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                set_based::harmonic_accuracy(c.truth(), c.predictions())
            }),
            scalar(names::F1_MACRO_BY_INSTANCE, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                set_based::f1_macro_by_instance(c.truth(), c.predictions())
            }),
            scalar(names::F1_MACRO_BY_LABEL, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::f1_macro_by_label(c.truth(), c.predictions())
            }),
            scalar(names::F1_MICRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::f1_micro(c.truth(), c.predictions())
            }),
            scalar(names::PRECISION_MACRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::precision_macro(c.truth(), c.predictions())
            }),
            scalar(names::PRECISION_MICRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::precision_micro(c.truth(), c.predictions())
            }),
            scalar(names::RECALL_MACRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::recall_macro(c.truth(), c.predictions())
            }),
            scalar(names::RECALL_MICRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::recall_micro(c.truth(), c.predictions())
            }),
            scalar(names::ONE_ERROR, Minimize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                ranking::one_error(c.truth(), c.confidences())
            }),
            scalar(names::AVERAGE_PRECISION, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                ranking::average_precision(c.truth(), c.confidences())
            }),
            scalar(names::RANK_LOSS, Minimize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                ranking::rank_loss(c.truth(), c.confidences())
            }),
            scalar(names::LOG_LOSS_MAX_LABELS, Minimize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                probabilistic::log_loss_max_labels(c.truth(), c.confidences())
            }),
            scalar(names::LOG_LOSS_MAX_INSTANCES, Minimize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                probabilistic::log_loss_max_instances(c.truth(), c.confidences())
            }),
            scalar(names::AUROC_MACRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                curve::auroc_macro(c.truth(), c.confidences(), c.parallel())
            }),
            scalar(names::AUPRC_MACRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                curve::auprc_macro(c.truth(), c.confidences(), c.parallel())
            }),
            scalar(names::AUROC_MICRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                curve::auroc_micro(c.truth(), c.confidences())
            }),
            scalar(names::AUPRC_MICRO, Maximize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                curve::auprc_micro(c.truth(), c.confidences())
            }),
            scalar(names::LEVENSHTEIN_DISTANCE, Minimize, Standard, ALL_TASKS, |c: &EvalContext<'_>| {
                sequence::levenshtein_distance(c.truth(), c.predictions())
            }),
            scalar(names::LABEL_CARDINALITY_TRUE, Maximize, Minimal, MULTI_LABEL, |c: &EvalContext<'_>| {
                statistics::label_cardinality(c.truth())
            }),
            scalar(names::LABEL_CARDINALITY_PREDICTED, Maximize, Minimal, MULTI_LABEL, |c: &EvalContext<'_>| {
                statistics::predicted_cardinality(c.truth(), c.predictions())
            }),
            scalar(names::EMPTY_PREDICTION_RATIO, Minimize, Standard, MULTI_LABEL, |c: &EvalContext<'_>| {
                statistics::empty_prediction_ratio(c.truth(), c.predictions())
            }),
        ];

        let vector = |name: &'static str, tasks: &'static [TaskKind], compute: VectorMetricFn| VectorMetricSpec {
            name,
            level: PerLabel,
            tasks,
            compute,
        };
        let vectors = vec![
            vector(names::HAMMING_SCORE_PER_LABEL, ALL_TASKS, |c: &EvalContext<'_>| {
                set_based::hamming_score_per_label(c.truth(), c.predictions())
            }),
            vector(names::PRECISION_PER_LABEL, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::precision_per_label(c.truth(), c.predictions())
            }),
            vector(names::RECALL_PER_LABEL, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::recall_per_label(c.truth(), c.predictions())
            }),
            vector(names::F1_PER_LABEL, MULTI_LABEL, |c: &EvalContext<'_>| {
                confusion::f1_per_label(c.truth(), c.predictions())
            }),
            vector(names::AUROC_PER_LABEL, MULTI_LABEL, |c: &EvalContext<'_>| {
                curve::auroc_per_label(c.truth(), c.confidences(), c.parallel())
            }),
            vector(names::AUPRC_PER_LABEL, MULTI_LABEL, |c: &EvalContext<'_>| {
                curve::auprc_per_label(c.truth(), c.confidences(), c.parallel())
            }),
        ];

        Self { scalars, vectors }
    }
}

/// Whether a truth entry is supervised.
#[inline]
pub(crate) fn is_observed(value: LabelValue) -> bool {
    value != MISSING
}

/// Mean of the defined (non-NaN) values; NaN when there are none.
pub(crate) fn mean_of_defined<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Arithmetic mean that propagates NaN; NaN for an empty input.
pub(crate) fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
