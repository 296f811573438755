//! Validated truth and confidence matrices and the binarization rule.
//!
//! Both matrices are `N x L` with instances as rows and labels as columns.
//! Once constructed they are read-only snapshots: metrics borrow views of
//! them and never mutate them.

use crate::core::constants::MISSING;
use crate::core::error::{EvalError, Result};
use crate::core::types::{Confidence, LabelValue};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ground-truth label assignments, with [`MISSING`] marking unsupervised
/// positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMatrix {
    data: Array2<LabelValue>,
}

impl LabelMatrix {
    /// Wrap an array, rejecting entries below the missing sentinel.
    pub fn new(data: Array2<LabelValue>) -> Result<Self> {
        for ((row, column), &value) in data.indexed_iter() {
            if value < MISSING {
                return Err(EvalError::invalid_label(row, column, value));
            }
        }
        Ok(Self { data })
    }

    /// Build from row vectors that must all share one length.
    pub fn from_rows(rows: &[Vec<LabelValue>]) -> Result<Self> {
        Self::new(rows_to_array(rows)?)
    }

    /// Number of instances (rows).
    pub fn num_instances(&self) -> usize {
        self.data.nrows()
    }

    /// Number of labels (columns).
    pub fn num_labels(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying array.
    pub fn view(&self) -> ArrayView2<'_, LabelValue> {
        self.data.view()
    }

    /// Borrow one instance's label vector.
    pub fn row(&self, index: usize) -> ArrayView1<'_, LabelValue> {
        self.data.row(index)
    }

    /// True when every non-missing entry is 0 or 1.
    pub fn is_binary(&self) -> bool {
        self.data.iter().all(|&v| v == MISSING || v == 0 || v == 1)
    }

    /// Fail with [`EvalError::InvalidLabel`] on the first non-binary entry.
    pub fn ensure_binary(&self) -> Result<()> {
        for ((row, column), &value) in self.data.indexed_iter() {
            if value != MISSING && value != 0 && value != 1 {
                return Err(EvalError::invalid_label(row, column, value));
            }
        }
        Ok(())
    }

    /// Number of supervised (non-missing) entries.
    pub fn num_observed(&self) -> usize {
        self.data.iter().filter(|&&v| v != MISSING).count()
    }

    /// Select a subset of rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(0), indices),
        }
    }

    /// Consume and return the underlying array.
    pub fn into_inner(self) -> Array2<LabelValue> {
        self.data
    }
}

/// Model output: one confidence per instance and label.
///
/// Values are conventionally in `[0, 1]` but are never clamped. For
/// multi-target problems the entries are predicted class values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceMatrix {
    data: Array2<Confidence>,
}

impl ConfidenceMatrix {
    /// Wrap an array.
    pub fn new(data: Array2<Confidence>) -> Self {
        Self { data }
    }

    /// Build from row vectors that must all share one length.
    pub fn from_rows(rows: &[Vec<Confidence>]) -> Result<Self> {
        Ok(Self::new(rows_to_array(rows)?))
    }

    /// Number of instances (rows).
    pub fn num_instances(&self) -> usize {
        self.data.nrows()
    }

    /// Number of labels (columns).
    pub fn num_labels(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying array.
    pub fn view(&self) -> ArrayView2<'_, Confidence> {
        self.data.view()
    }

    /// Check that this matrix lines up with a truth matrix.
    pub fn ensure_matches(&self, truth: &LabelMatrix) -> Result<()> {
        ensure_same_shape(truth.view(), self.view())
    }

    /// Select a subset of rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(0), indices),
        }
    }

    /// Consume and return the underlying array.
    pub fn into_inner(self) -> Array2<Confidence> {
        self.data
    }
}

/// A resolved classification threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// One cutoff for every label
    Global(f64),
    /// One cutoff per label
    PerLabel(Vec<f64>),
}

impl Threshold {
    /// Cutoff applied to the given label; `None` when a per-label threshold
    /// has no entry for it.
    pub fn for_label(&self, label: usize) -> Option<f64> {
        match self {
            Threshold::Global(t) => Some(*t),
            Threshold::PerLabel(ts) => ts.get(label).copied(),
        }
    }

    /// Expand to one cutoff per label.
    pub fn per_label(&self, num_labels: usize) -> Vec<f64> {
        match self {
            Threshold::Global(t) => vec![*t; num_labels],
            Threshold::PerLabel(ts) => ts.clone(),
        }
    }

    /// Check that a per-label threshold covers exactly `num_labels` labels.
    pub fn ensure_num_labels(&self, num_labels: usize) -> Result<()> {
        if let Threshold::PerLabel(ts) = self {
            if ts.len() != num_labels {
                return Err(EvalError::dimension_mismatch(
                    format!("{} per-label thresholds", num_labels),
                    format!("{} thresholds", ts.len()),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Global(t) => write!(f, "{}", t),
            Threshold::PerLabel(ts) => {
                let parts: Vec<String> = ts.iter().map(|t| t.to_string()).collect();
                write!(f, "[{}]", parts.join(","))
            }
        }
    }
}

/// Binarize confidences: a label is predicted iff its confidence is strictly
/// greater than its threshold.
pub fn binarize(
    confidences: ArrayView2<'_, Confidence>,
    threshold: &Threshold,
) -> Result<Array2<LabelValue>> {
    threshold.ensure_num_labels(confidences.ncols())?;
    let cutoffs = threshold.per_label(confidences.ncols());
    Ok(Array2::from_shape_fn(confidences.dim(), |(i, j)| {
        LabelValue::from(confidences[[i, j]] > cutoffs[j])
    }))
}

/// Round multi-target class predictions to the nearest class value.
pub fn round_predictions(predictions: ArrayView2<'_, Confidence>) -> Array2<LabelValue> {
    predictions.mapv(|p| p.round() as LabelValue)
}

/// Check that truth and another `N x L` matrix agree in shape.
pub fn ensure_same_shape<A, B>(truth: ArrayView2<'_, A>, other: ArrayView2<'_, B>) -> Result<()> {
    if truth.dim() != other.dim() {
        return Err(EvalError::dimension_mismatch(
            format!("{} x {}", truth.nrows(), truth.ncols()),
            format!("{} x {}", other.nrows(), other.ncols()),
        ));
    }
    Ok(())
}

fn rows_to_array<T: Copy>(rows: &[Vec<T>]) -> Result<Array2<T>> {
    let num_labels = rows.first().map_or(0, |r| r.len());
    let mut flat = Vec::with_capacity(rows.len() * num_labels);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != num_labels {
            return Err(EvalError::dimension_mismatch(
                format!("{} entries in every row", num_labels),
                format!("{} entries in row {}", row.len(), i),
            ));
        }
        flat.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), num_labels), flat)
        .map_err(|e| EvalError::dimension_mismatch(format!("{} x {}", rows.len(), num_labels), e.to_string()))
}
