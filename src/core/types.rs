//! Core data types shared by the metrics, calibration and result modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::EvalError;

/// Truth value type. `0`/`1` for multi-label data, any non-negative class
/// index for multi-target data, or [`MISSING`](crate::core::constants::MISSING).
pub type LabelValue = i32;

/// Model confidence type.
pub type Confidence = f64;

/// Amount of detail computed when a result is finalized.
///
/// Levels are cumulative: every level includes the metrics of the levels
/// below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Exact match, Hamming score, Jaccard index and label counts
    Minimal = 1,
    /// Every scalar metric
    Standard = 2,
    /// Scalar metrics plus per-label vectors
    PerLabel = 3,
    /// Everything, including curve data
    Full = 4,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Standard
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verbosity::Minimal => write!(f, "minimal"),
            Verbosity::Standard => write!(f, "standard"),
            Verbosity::PerLabel => write!(f, "per_label"),
            Verbosity::Full => write!(f, "full"),
        }
    }
}

impl FromStr for Verbosity {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "minimal" => Ok(Verbosity::Minimal),
            "2" | "standard" => Ok(Verbosity::Standard),
            "3" | "per_label" | "perlabel" => Ok(Verbosity::PerLabel),
            "4" | "full" => Ok(Verbosity::Full),
            other => Err(EvalError::invalid_parameter(
                "verbosity",
                other,
                "expected one of minimal, standard, per_label, full or 1-4",
            )),
        }
    }
}

/// Kind of prediction problem being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Binary relevance per label; predictions are confidences to threshold
    MultiLabel,
    /// Each target takes a class value; predictions are class values
    MultiTarget,
}

impl Default for TaskKind {
    fn default() -> Self {
        TaskKind::MultiLabel
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::MultiLabel => write!(f, "multi_label"),
            TaskKind::MultiTarget => write!(f, "multi_target"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "multi_label" | "multilabel" => Ok(TaskKind::MultiLabel),
            "multi_target" | "multitarget" => Ok(TaskKind::MultiTarget),
            other => Err(EvalError::invalid_parameter(
                "task",
                other,
                "expected multi_label or multi_target",
            )),
        }
    }
}

/// Whether lower or higher values of a metric are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricDirection {
    /// Loss-style metric
    Minimize,
    /// Payoff-style metric
    Maximize,
}

impl fmt::Display for MetricDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricDirection::Minimize => write!(f, "minimize"),
            MetricDirection::Maximize => write!(f, "maximize"),
        }
    }
}

/// Evaluation loop a result was produced by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// One fold of a cross-validation
    CrossValidationFold(usize),
    /// A single train/test split
    TrainTest,
    /// One window of a prequential stream
    Window(usize),
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunType::CrossValidationFold(fold) => write!(f, "cv_fold_{}", fold),
            RunType::TrainTest => write!(f, "train_test"),
            RunType::Window(window) => write!(f, "window_{}", window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Minimal < Verbosity::Standard);
        assert!(Verbosity::PerLabel < Verbosity::Full);
        assert_eq!(Verbosity::default(), Verbosity::Standard);
    }

    #[test]
    fn test_verbosity_parse() {
        assert_eq!("3".parse::<Verbosity>().unwrap(), Verbosity::PerLabel);
        assert_eq!(" Full ".parse::<Verbosity>().unwrap(), Verbosity::Full);
        assert!("7".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_task_kind_parse() {
        assert_eq!("multi-target".parse::<TaskKind>().unwrap(), TaskKind::MultiTarget);
        assert_eq!(TaskKind::default().to_string(), "multi_label");
        assert!("regression".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_run_type_display() {
        assert_eq!(RunType::CrossValidationFold(2).to_string(), "cv_fold_2");
        assert_eq!(RunType::Window(0).to_string(), "window_0");
        assert_eq!(RunType::TrainTest.to_string(), "train_test");
    }
}
