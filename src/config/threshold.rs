//! Threshold specifications as they appear in configuration.
//!
//! Accepted forms:
//!
//! - `PCut1`: calibrate one global threshold by proportional cut
//! - `PCutL`: calibrate one threshold per label by proportional cut
//! - `0.5`: a fixed threshold for every label
//! - `[0.1,0.2,0.8]`: a fixed threshold per label

use crate::core::constants::{PCUT_GLOBAL_TOKEN, PCUT_PER_LABEL_TOKEN};
use crate::core::error::{EvalError, Result};
use crate::core::matrix::Threshold;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the classification threshold is chosen for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ThresholdSpec {
    /// Global proportional cut
    PCutGlobal,
    /// Per-label proportional cut
    PCutPerLabel,
    /// Fixed cutoff for every label
    Fixed(f64),
    /// Fixed cutoff per label
    FixedPerLabel(Vec<f64>),
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        ThresholdSpec::PCutGlobal
    }
}

impl ThresholdSpec {
    /// Whether a calibration target is needed to resolve this threshold.
    pub fn needs_calibration(&self) -> bool {
        matches!(self, ThresholdSpec::PCutGlobal | ThresholdSpec::PCutPerLabel)
    }

    /// Resolve a fixed threshold for `num_labels` labels. Returns `Ok(None)` for
    /// proportional cuts.
    pub fn fixed_threshold(&self, num_labels: usize) -> Result<Option<Threshold>> {
        match self {
            ThresholdSpec::PCutGlobal | ThresholdSpec::PCutPerLabel => Ok(None),
            ThresholdSpec::Fixed(t) => Ok(Some(Threshold::Global(*t))),
            ThresholdSpec::FixedPerLabel(ts) => {
                let threshold = Threshold::PerLabel(ts.clone());
                threshold.ensure_num_labels(num_labels)?;
                Ok(Some(threshold))
            }
        }
    }
}

fn parse_value(token: &str) -> Result<f64> {
    let value: f64 = token.trim().parse().map_err(|_| {
        EvalError::invalid_parameter("threshold", token.trim(), "not a numeric literal")
    })?;
    if !value.is_finite() {
        return Err(EvalError::invalid_parameter(
            "threshold",
            token.trim(),
            "must be finite",
        ));
    }
    Ok(value)
}

impl FromStr for ThresholdSpec {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(PCUT_GLOBAL_TOKEN) {
            return Ok(ThresholdSpec::PCutGlobal);
        }
        if s.eq_ignore_ascii_case(PCUT_PER_LABEL_TOKEN) {
            return Ok(ThresholdSpec::PCutPerLabel);
        }
        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(|| {
                EvalError::invalid_parameter("threshold", s, "unterminated threshold list")
            })?;
            if inner.trim().is_empty() {
                return Err(EvalError::invalid_parameter(
                    "threshold",
                    s,
                    "threshold list is empty",
                ));
            }
            let values = inner.split(',').map(parse_value).collect::<Result<Vec<_>>>()?;
            return Ok(ThresholdSpec::FixedPerLabel(values));
        }
        parse_value(s).map(ThresholdSpec::Fixed)
    }
}

impl fmt::Display for ThresholdSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdSpec::PCutGlobal => write!(f, "{}", PCUT_GLOBAL_TOKEN),
            ThresholdSpec::PCutPerLabel => write!(f, "{}", PCUT_PER_LABEL_TOKEN),
            ThresholdSpec::Fixed(t) => write!(f, "{}", t),
            ThresholdSpec::FixedPerLabel(ts) => {
                let parts: Vec<String> = ts.iter().map(|t| t.to_string()).collect();
                write!(f, "[{}]", parts.join(","))
            }
        }
    }
}

impl TryFrom<String> for ThresholdSpec {
    type Error = EvalError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ThresholdSpec> for String {
    fn from(spec: ThresholdSpec) -> Self {
        spec.to_string()
    }
}
