//! Evaluation runs and their aggregation.
//!
//! - [`result`]: one run, accumulated row by row and finalized once
//! - [`aggregate`]: mean and spread across runs
//!
//! The helpers in this module cover the two common drivers: a single batch
//! (a train/test split or one cross-validation fold) and a batch cut into
//! consecutive windows, as in prequential stream evaluation.

pub mod aggregate;
pub mod result;

pub use aggregate::{AggregatedResult, MetricSummary};
pub use result::EvalResult;

use crate::config::EvalConfig;
use crate::core::error::{EvalError, Result};
use crate::core::matrix::{ConfidenceMatrix, LabelMatrix};
use crate::core::types::{RunType, TaskKind};
use crate::metrics::statistics::CalibrationTarget;

fn target_for(truth: &LabelMatrix, config: &EvalConfig) -> Result<Option<CalibrationTarget>> {
    if config.task == TaskKind::MultiLabel && config.threshold.needs_calibration() {
        CalibrationTarget::from_truth(truth).map(Some)
    } else {
        Ok(None)
    }
}

/// Evaluate a batch with proportional cuts calibrated against the supplied
/// training statistics.
pub fn evaluate_with_target(
    truth: &LabelMatrix,
    confidences: &ConfidenceMatrix,
    config: &EvalConfig,
    target: Option<CalibrationTarget>,
) -> Result<EvalResult> {
    let mut result = EvalResult::from_matrices(truth, confidences, config.clone())?
        .with_run_type(RunType::TrainTest)?;
    if let Some(target) = target {
        result = result.with_calibration_target(target)?;
    }
    result.finalize()?;
    Ok(result)
}

/// Evaluate a batch in one call with a fixed threshold.
///
/// Proportional cuts need the label statistics of training data, which this
/// helper does not have: a `PCut1`/`PCutL` configuration fails with a
/// calibration error. Use [`evaluate_with_target`] for those.
///
/// ```rust
/// use multilabel_eval::{evaluate, ConfidenceMatrix, EvalConfigBuilder, LabelMatrix};
///
/// let truth = LabelMatrix::from_rows(&[vec![1, 0, 1], vec![0, 1, 0]])?;
/// let confidences = ConfidenceMatrix::from_rows(&[vec![0.9, 0.2, 0.7], vec![0.1, 0.8, 0.3]])?;
/// let config = EvalConfigBuilder::new().threshold_str("0.5").build()?;
///
/// let result = evaluate(&truth, &confidences, &config)?;
/// assert_eq!(result.metric("exact_match"), Some(1.0));
/// # Ok::<(), multilabel_eval::EvalError>(())
/// ```
pub fn evaluate(truth: &LabelMatrix, confidences: &ConfidenceMatrix, config: &EvalConfig) -> Result<EvalResult> {
    evaluate_with_target(truth, confidences, config, None)
}

/// Split a batch into consecutive windows of `window_size` instances,
/// finalize one result per window and aggregate them.
///
/// The last window may be shorter. Proportional cuts for a window are
/// calibrated against all rows before it; the first window uses its own
/// rows.
pub fn evaluate_windows(
    truth: &LabelMatrix,
    confidences: &ConfidenceMatrix,
    window_size: usize,
    config: &EvalConfig,
) -> Result<(Vec<EvalResult>, AggregatedResult)> {
    if window_size == 0 {
        return Err(EvalError::invalid_parameter(
            "window_size",
            "0",
            "windows must hold at least one instance",
        ));
    }
    confidences.ensure_matches(truth)?;
    let n = truth.num_instances();
    if n == 0 {
        return Err(EvalError::invalid_parameter(
            "truth",
            "0 instances",
            "nothing to split into windows",
        ));
    }

    let mut results = Vec::with_capacity(n.div_ceil(window_size));
    for (window, start) in (0..n).step_by(window_size).enumerate() {
        let end = (start + window_size).min(n);
        let rows: Vec<usize> = (start..end).collect();
        let seen: Vec<usize> = if start == 0 { rows.clone() } else { (0..start).collect() };

        let mut result = EvalResult::from_matrices(
            &truth.select_rows(&rows),
            &confidences.select_rows(&rows),
            config.clone(),
        )?
        .with_run_type(RunType::Window(window))?;
        if let Some(target) = target_for(&truth.select_rows(&seen), config)? {
            result = result.with_calibration_target(target)?;
        }
        result.finalize()?;
        log::debug!("window {} covers instances {}..{}", window, start, end);
        results.push(result);
    }

    let aggregated = AggregatedResult::from_results(&results)?;
    Ok((results, aggregated))
}
