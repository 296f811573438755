//! Proportional-cut (PCut) threshold calibration.
//!
//! PCut chooses the cutoff whose predicted label cardinality on the
//! evaluated confidences comes closest to the cardinality observed in
//! training. Candidate cutoffs are the distinct confidence values present.
//! Since the observed cardinality only falls as the cutoff rises, an
//! ascending scan that keeps the first strict improvement breaks ties
//! toward the lower, more permissive cutoff.
//!
//! The achievable range of a target is what a labeling can have: `[0, L]`
//! for a cardinality and `[0, 1]` for a label frequency. Targets outside it
//! are calibration errors. A target inside it that no candidate reaches
//! exactly, such as `L` when the lowest cutoff still leaves its own value
//! below, calibrates to the closest candidate.

use crate::config::ThresholdSpec;
use crate::core::error::{EvalError, Result};
use crate::core::matrix::Threshold;
use crate::core::types::Confidence;
use crate::metrics::statistics::CalibrationTarget;
use ndarray::{ArrayView2, Axis};

/// Mean number of confidences per instance strictly above `threshold`.
pub fn observed_cardinality(confidences: ArrayView2<'_, Confidence>, threshold: f64) -> f64 {
    if confidences.nrows() == 0 {
        return f64::NAN;
    }
    let above = confidences.iter().filter(|&&c| c > threshold).count();
    above as f64 / confidences.nrows() as f64
}

/// Scan `(threshold, observed)` pairs and keep the closest to `target`.
fn closest(scan: impl Iterator<Item = (f64, f64)>, target: f64) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64, f64)> = None;
    for (threshold, observed) in scan {
        let gap = (observed - target).abs();
        match best {
            Some((_, _, best_gap)) if gap >= best_gap => {}
            _ => best = Some((threshold, observed, gap)),
        }
    }
    best.map(|(t, o, _)| (t, o))
}

/// Distinct non-NaN values in ascending order, each with the number of
/// values strictly above it.
fn sweep<'a, I>(values: I) -> Vec<(f64, usize)>
where
    I: IntoIterator<Item = &'a Confidence>,
{
    let mut sorted: Vec<f64> = values.into_iter().copied().filter(|c| !c.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    let total = sorted.len();

    let mut out = Vec::new();
    let mut i = 0;
    while i < total {
        let value = sorted[i];
        while i < total && sorted[i] == value {
            i += 1;
        }
        out.push((value, total - i));
    }
    out
}

fn ensure_target(target: f64, upper: f64, what: &str) -> Result<()> {
    if !target.is_finite() || target < 0.0 || target > upper {
        return Err(EvalError::calibration(format!(
            "{} target {} is outside [0, {}]",
            what, target, upper
        )));
    }
    Ok(())
}

/// Global proportional cut: one threshold for every label.
pub fn pcut_global(confidences: ArrayView2<'_, Confidence>, target_cardinality: f64) -> Result<f64> {
    let (n, l) = confidences.dim();
    if n == 0 || l == 0 {
        return Err(EvalError::calibration("cannot calibrate on an empty confidence matrix"));
    }
    ensure_target(target_cardinality, l as f64, "cardinality")?;

    let scan = sweep(confidences.iter())
        .into_iter()
        .map(|(t, above)| (t, above as f64 / n as f64));
    let (threshold, achieved) = closest(scan, target_cardinality)
        .ok_or_else(|| EvalError::calibration("no comparable confidence values"))?;

    log::info!(
        "PCut1 threshold {:.6} gives cardinality {:.4} (target {:.4})",
        threshold,
        achieved,
        target_cardinality
    );
    Ok(threshold)
}

/// Per-label proportional cut: each label's positive rate is matched to its
/// own target in `[0, 1]`.
pub fn pcut_per_label(confidences: ArrayView2<'_, Confidence>, targets: &[f64]) -> Result<Vec<f64>> {
    let (n, l) = confidences.dim();
    if n == 0 || l == 0 {
        return Err(EvalError::calibration("cannot calibrate on an empty confidence matrix"));
    }
    if targets.len() != l {
        return Err(EvalError::dimension_mismatch(
            format!("{} per-label targets", l),
            format!("{} targets", targets.len()),
        ));
    }

    let thresholds = confidences
        .axis_iter(Axis(1))
        .zip(targets)
        .enumerate()
        .map(|(label, (column, &target))| {
            ensure_target(target, 1.0, &format!("label {} frequency", label))?;
            let scan = sweep(column)
                .into_iter()
                .map(|(t, above)| (t, above as f64 / n as f64));
            closest(scan, target).map(|(t, _)| t).ok_or_else(|| {
                EvalError::calibration(format!("label {} has no comparable confidence values", label))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!("PCutL calibrated {} per-label thresholds", thresholds.len());
    Ok(thresholds)
}

/// Resolve a threshold specification against evaluated confidences.
///
/// Fixed specifications ignore the target; calibrated ones require it.
pub fn resolve_threshold(
    spec: &ThresholdSpec,
    confidences: ArrayView2<'_, Confidence>,
    target: Option<&CalibrationTarget>,
) -> Result<Threshold> {
    if let Some(fixed) = spec.fixed_threshold(confidences.ncols())? {
        return Ok(fixed);
    }
    let target = target.ok_or_else(|| {
        EvalError::calibration(format!("threshold '{}' needs a calibration target", spec))
    })?;
    match spec {
        ThresholdSpec::PCutPerLabel => {
            pcut_per_label(confidences, &target.per_label).map(Threshold::PerLabel)
        }
        _ => pcut_global(confidences, target.cardinality).map(Threshold::Global),
    }
}
