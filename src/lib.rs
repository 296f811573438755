//! # multilabel-eval
//!
//! Evaluation metrics for multi-label and multi-target classifiers.
//!
//! Given a truth matrix (instances × labels, with `-1` marking unsupervised
//! positions) and a matrix of predicted confidences, the crate computes a
//! battery of set-based, ranking, probabilistic and curve-based measures,
//! calibrates classification thresholds by proportional cut, and aggregates
//! runs across cross-validation folds or stream windows.
//!
//! ## Features
//!
//! - **Missing labels**: unsupervised truth entries are excluded from every
//!   ratio; a metric with nothing left to compare is NaN, never an error.
//! - **Threshold calibration**: fixed global or per-label cutoffs, or the
//!   `PCut1`/`PCutL` proportional cuts matched to training cardinality.
//! - **Metric registry**: every metric is a pure function over a read-only
//!   [`metrics::EvalContext`], selected by [`Verbosity`] and [`TaskKind`] and
//!   optionally evaluated in parallel with Rayon.
//! - **Aggregation**: `mean ± stdev` across runs, with loud failures when
//!   runs disagree on their metric sets.
//!
//! ## Quick Start
//!
//! ```rust
//! use multilabel_eval::{EvalConfigBuilder, EvalResult, ThresholdSpec};
//!
//! # fn main() -> multilabel_eval::Result<()> {
//! let config = EvalConfigBuilder::new()
//!     .threshold(ThresholdSpec::Fixed(0.5))
//!     .build()?;
//!
//! let mut result = EvalResult::new(3, config)?;
//! result.add_row(&[0.9, 0.2, 0.7], &[1, 0, 1])?;
//! result.add_row(&[0.1, 0.8, 0.6], &[0, 1, 0])?;
//! result.finalize()?;
//!
//! assert_eq!(result.metric("exact_match"), Some(0.5));
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```
//!
//! ## Cross-validation
//!
//! ```rust
//! use multilabel_eval::{
//!     evaluate_with_target, AggregatedResult, CalibrationTarget, ConfidenceMatrix, EvalConfig,
//!     LabelMatrix,
//! };
//!
//! # fn main() -> multilabel_eval::Result<()> {
//! let folds = vec![
//!     (vec![vec![1, 0], vec![0, 1]], vec![vec![0.8, 0.3], vec![0.2, 0.9]]),
//!     (vec![vec![1, 1], vec![0, 0]], vec![vec![0.7, 0.6], vec![0.4, 0.1]]),
//! ];
//!
//! let mut results = Vec::new();
//! for (k, (truth, confidences)) in folds.iter().enumerate() {
//!     // PCut1 (the default) matches the cardinality of the other fold
//!     let train = LabelMatrix::from_rows(&folds[1 - k].0)?;
//!     let target = CalibrationTarget::from_truth(&train)?;
//!     let truth = LabelMatrix::from_rows(truth)?;
//!     let confidences = ConfidenceMatrix::from_rows(confidences)?;
//!     results.push(evaluate_with_target(&truth, &confidences, &EvalConfig::default(), Some(target))?);
//! }
//!
//! let aggregated = AggregatedResult::from_results(&results)?;
//! println!("{}", aggregated.formatted()["hamming_score"]);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/multilabel-eval/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Metric functions and the metric registry
pub mod metrics;

// Proportional-cut threshold calibration
pub mod calibration;

// Evaluation runs and aggregation
pub mod evaluation;

// Re-export core functionality for convenience
pub use self::core::{
    constants::*,
    error::{EvalError, Result},
    matrix::{binarize, ConfidenceMatrix, LabelMatrix, Threshold},
    types::*,
};

// Re-export configuration functionality
pub use config::{EvalConfig, EvalConfigBuilder, ThresholdSpec};

// Re-export metrics functionality
pub use metrics::{
    statistics::CalibrationTarget, ConfusionCounts, Curve, CurvePoint, CurveRow, CurveSet,
    EvalContext, MetricRegistry, MetricSpec,
};

// Re-export calibration functionality
pub use calibration::{observed_cardinality, pcut_global, pcut_per_label, resolve_threshold};

// Re-export evaluation functionality
pub use evaluation::{
    evaluate, evaluate_windows, evaluate_with_target, AggregatedResult, EvalResult, MetricSummary,
};

// Version information
pub use self::core::constants::MULTILABEL_EVAL_VERSION as VERSION;

/// Initialize the library.
///
/// Installs an `env_logger` logger (defaulting to `info` when `RUST_LOG` is
/// unset) unless the host application already installed one. Calling it is
/// optional; the library works without a logger.
///
/// # Examples
///
/// ```rust
/// fn main() -> multilabel_eval::Result<()> {
///     multilabel_eval::init()?;
///     assert!(multilabel_eval::is_initialized());
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    self::core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    self::core::is_core_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_initialization() {
        assert!(init().is_ok());
        assert!(is_initialized());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_reexports() {
        let config = EvalConfigBuilder::new()
            .threshold_str("0.5")
            .verbosity(Verbosity::Minimal)
            .build()
            .unwrap();
        let truth = LabelMatrix::from_rows(&[vec![1, MISSING]]).unwrap();
        let confidences = ConfidenceMatrix::from_rows(&[vec![0.7, 0.9]]).unwrap();
        let result = evaluate(&truth, &confidences, &config).unwrap();
        assert_eq!(result.metric("hamming_score"), Some(1.0));
    }
}
