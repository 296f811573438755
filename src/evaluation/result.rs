//! One evaluation run: accumulated rows, metadata and the finalized metrics.

use crate::calibration::resolve_threshold;
use crate::config::EvalConfig;
use crate::core::constants::*;
use crate::core::error::{EvalError, Result};
use crate::core::matrix::{binarize, round_predictions, ConfidenceMatrix, LabelMatrix, Threshold};
use crate::core::types::*;
use crate::metrics::statistics::CalibrationTarget;
use crate::metrics::{names, CurveSet, EvalContext, MetricRegistry};
use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Result of one run (a cross-validation fold, a train/test split or a
/// stream window).
///
/// Rows are appended while predictions arrive. [`EvalResult::finalize`]
/// resolves the threshold, computes every metric selected by the configured
/// verbosity and freezes the result; afterwards it rejects new rows,
/// metadata and a second finalization.
#[derive(Debug, Clone, Serialize)]
pub struct EvalResult {
    num_labels: usize,
    num_rows: usize,
    config: EvalConfig,
    #[serde(skip)]
    truth: Vec<LabelValue>,
    #[serde(skip)]
    confidences: Vec<Confidence>,
    metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calibration_target: Option<CalibrationTarget>,
    finalized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<Threshold>,
    metrics: BTreeMap<String, f64>,
    vectors: BTreeMap<String, Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    curves: Option<CurveSet>,
}

impl EvalResult {
    /// Create an empty result for `num_labels` labels.
    pub fn new(num_labels: usize, config: EvalConfig) -> Result<Self> {
        if num_labels == 0 {
            return Err(EvalError::invalid_parameter(
                "num_labels",
                "0",
                "at least one label is required",
            ));
        }
        config.validate()?;

        let mut metadata = BTreeMap::new();
        metadata.insert(META_THRESHOLD.to_string(), config.threshold.to_string());
        metadata.insert(META_VERBOSITY.to_string(), config.verbosity.to_string());
        metadata.insert(META_TASK.to_string(), config.task.to_string());

        Ok(Self {
            num_labels,
            num_rows: 0,
            config,
            truth: Vec::new(),
            confidences: Vec::new(),
            metadata,
            calibration_target: None,
            finalized: false,
            threshold: None,
            metrics: BTreeMap::new(),
            vectors: BTreeMap::new(),
            curves: None,
        })
    }

    /// Create a result holding every row of a batch. The result is not yet
    /// finalized.
    pub fn from_matrices(truth: &LabelMatrix, confidences: &ConfidenceMatrix, config: EvalConfig) -> Result<Self> {
        confidences.ensure_matches(truth)?;
        let mut result = Self::new(truth.num_labels(), config)?;
        result.add_rows(confidences.view(), truth.view())?;
        Ok(result)
    }

    /// Attach the training statistics used by proportional-cut thresholds.
    pub fn with_calibration_target(mut self, target: CalibrationTarget) -> Result<Self> {
        self.ensure_open("attach a calibration target to")?;
        self.calibration_target = Some(target);
        Ok(self)
    }

    /// Tag the result with the loop that produced it.
    pub fn with_run_type(mut self, run_type: RunType) -> Result<Self> {
        self.ensure_open("change the run type of")?;
        self.metadata.insert(META_RUN_TYPE.to_string(), run_type.to_string());
        Ok(self)
    }

    fn ensure_open(&self, action: &str) -> Result<()> {
        if self.finalized {
            return Err(EvalError::state(format!("cannot {} a finalized result", action)));
        }
        Ok(())
    }

    /// Append one instance.
    pub fn add_row(&mut self, confidences: &[Confidence], truth: &[LabelValue]) -> Result<()> {
        self.ensure_open("add rows to")?;
        for (what, len) in [("confidence", confidences.len()), ("truth", truth.len())] {
            if len != self.num_labels {
                return Err(EvalError::dimension_mismatch(
                    format!("{} {} entries", self.num_labels, what),
                    format!("{} entries in row {}", len, self.num_rows),
                ));
            }
        }
        for (column, &value) in truth.iter().enumerate() {
            let valid = match self.config.task {
                TaskKind::MultiLabel => value == MISSING || value == 0 || value == 1,
                TaskKind::MultiTarget => value >= MISSING,
            };
            if !valid {
                return Err(EvalError::invalid_label(self.num_rows, column, value));
            }
        }

        self.confidences.extend_from_slice(confidences);
        self.truth.extend_from_slice(truth);
        self.num_rows += 1;
        Ok(())
    }

    /// Append every row of a batch.
    pub fn add_rows(&mut self, confidences: ArrayView2<'_, Confidence>, truth: ArrayView2<'_, LabelValue>) -> Result<()> {
        crate::core::matrix::ensure_same_shape(truth, confidences)?;
        for (c, y) in confidences.axis_iter(Axis(0)).zip(truth.axis_iter(Axis(0))) {
            self.add_row(&c.to_vec(), &y.to_vec())?;
        }
        Ok(())
    }

    /// Set a metadata entry.
    ///
    /// The `threshold` and `verbosity` entries are what
    /// [`EvalResult::finalize`] uses: their values are parsed and stored in
    /// canonical form. `task` is fixed at creation and `threshold_resolved`
    /// is written by finalization, so neither can be set.
    pub fn set_meta<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Result<()> {
        self.ensure_open("change metadata of")?;
        let (key, value) = (key.into(), value.into());
        let stored = match key.as_str() {
            META_THRESHOLD => {
                let mut config = self.config.clone();
                config.threshold = value.parse()?;
                config.validate()?;
                config.threshold.fixed_threshold(self.num_labels)?;
                self.config = config;
                self.config.threshold.to_string()
            }
            META_VERBOSITY => {
                self.config.verbosity = value.parse()?;
                self.config.verbosity.to_string()
            }
            META_TASK | META_THRESHOLD_RESOLVED => {
                return Err(EvalError::invalid_parameter(key.as_str(), value, "reserved metadata entry"));
            }
            _ => value,
        };
        self.metadata.insert(key, stored);
        Ok(())
    }

    /// Look up a metadata entry.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// All metadata.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Configuration this result was created with.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Number of labels.
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Number of accumulated instances.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Whether [`EvalResult::finalize`] has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn truth_array(&self) -> Result<Array2<LabelValue>> {
        Array2::from_shape_vec((self.num_rows, self.num_labels), self.truth.clone())
            .map_err(|e| EvalError::state(format!("corrupt truth buffer: {}", e)))
    }

    fn confidence_array(&self) -> Result<Array2<Confidence>> {
        Array2::from_shape_vec((self.num_rows, self.num_labels), self.confidences.clone())
            .map_err(|e| EvalError::state(format!("corrupt confidence buffer: {}", e)))
    }

    /// Compute the metric map and freeze the result.
    pub fn finalize(&mut self) -> Result<()> {
        self.ensure_open("finalize")?;
        let truth = self.truth_array()?;
        let confidences = self.confidence_array()?;
        let verbosity = self.config.verbosity;
        let task = self.config.task;

        let (predictions, threshold) = match task {
            TaskKind::MultiTarget => (round_predictions(confidences.view()), None),
            TaskKind::MultiLabel => {
                let threshold = resolve_threshold(
                    &self.config.threshold,
                    confidences.view(),
                    self.calibration_target.as_ref(),
                )?;
                (binarize(confidences.view(), &threshold)?, Some(threshold))
            }
        };

        let ctx = EvalContext::new(truth.view(), confidences.view(), predictions.view())?
            .with_parallel(self.config.parallel);
        let registry = MetricRegistry::standard();
        let metrics = registry.evaluate(&ctx, verbosity, task);
        let mut vectors = registry.evaluate_vectors(&ctx, verbosity, task);

        if let Some(threshold) = &threshold {
            if verbosity >= Verbosity::PerLabel {
                vectors.insert(
                    names::THRESHOLD_PER_LABEL.to_string(),
                    threshold.per_label(self.num_labels),
                );
            }
            self.metadata
                .insert(META_THRESHOLD_RESOLVED.to_string(), threshold.to_string());
        }
        if verbosity >= Verbosity::Full && task == TaskKind::MultiLabel {
            self.curves = Some(CurveSet::build(truth.view(), confidences.view(), self.config.parallel));
        }

        log::info!(
            "finalized {} rows x {} labels ({} metrics, threshold {})",
            self.num_rows,
            self.num_labels,
            metrics.len(),
            threshold.as_ref().map_or_else(|| "n/a".to_string(), |t| t.to_string())
        );

        self.metrics = metrics;
        self.vectors = vectors;
        self.threshold = threshold;
        self.finalized = true;
        Ok(())
    }

    /// Value of one scalar metric, once finalized.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// All scalar metrics; empty before finalization.
    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    /// One per-label vector, once finalized.
    pub fn vector(&self, name: &str) -> Option<&[f64]> {
        self.vectors.get(name).map(Vec::as_slice)
    }

    /// All per-label vectors; empty below per-label verbosity.
    pub fn vectors(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.vectors
    }

    /// Curve data, present at full verbosity.
    pub fn curves(&self) -> Option<&CurveSet> {
        self.curves.as_ref()
    }

    /// Threshold applied at finalization.
    pub fn threshold(&self) -> Option<&Threshold> {
        self.threshold.as_ref()
    }

    /// Serialize metadata, metrics, vectors and curves. NaN becomes `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for EvalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.metadata {
            writeln!(f, "{:<28} {}", key, value)?;
        }
        writeln!(f, "{:<28} {}", "instances", self.num_rows)?;
        writeln!(f, "{:<28} {}", "labels", self.num_labels)?;
        if !self.finalized {
            return writeln!(f, "(not finalized)");
        }
        for (name, value) in &self.metrics {
            writeln!(f, "{:<28} {:.4}", name, value)?;
        }
        for (name, values) in &self.vectors {
            let parts: Vec<String> = values.iter().map(|v| format!("{:.4}", v)).collect();
            writeln!(f, "{:<28} [{}]", name, parts.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EvalConfigBuilder, ThresholdSpec};

    fn fixed_config(verbosity: Verbosity) -> EvalConfig {
        EvalConfigBuilder::new()
            .threshold(ThresholdSpec::Fixed(0.5))
            .verbosity(verbosity)
            .parallel(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_lifecycle() {
        let mut result = EvalResult::new(2, fixed_config(Verbosity::Standard)).unwrap();
        result.add_row(&[0.9, 0.1], &[1, 0]).unwrap();
        result.add_row(&[0.2, 0.7], &[0, 1]).unwrap();
        result.set_meta("fold", "0").unwrap();
        assert!(result.metrics().is_empty());

        result.finalize().unwrap();
        assert!(result.is_finalized());
        assert_eq!(result.metric(names::EXACT_MATCH), Some(1.0));
        assert_eq!(result.meta(META_THRESHOLD_RESOLVED), Some("0.5"));
        assert_eq!(result.meta("fold"), Some("0"));

        assert!(result.add_row(&[0.5, 0.5], &[1, 1]).is_err());
        assert!(result.set_meta("fold", "1").is_err());
        let err = result.finalize().unwrap_err();
        assert_eq!(err.category(), "state");
    }

    #[test]
    fn test_finalized_result_rejects_builders() {
        let mut result = EvalResult::new(2, fixed_config(Verbosity::Standard))
            .unwrap()
            .with_run_type(RunType::TrainTest)
            .unwrap();
        result.add_row(&[0.9, 0.1], &[1, 0]).unwrap();
        result.finalize().unwrap();

        let err = result.clone().with_run_type(RunType::Window(7)).unwrap_err();
        assert_eq!(err.category(), "state");
        let target = CalibrationTarget {
            cardinality: 1.0,
            per_label: vec![0.5, 0.5],
        };
        assert_eq!(result.clone().with_calibration_target(target).unwrap_err().category(), "state");
        assert_eq!(result.meta(META_RUN_TYPE), Some("train_test"));
    }

    #[test]
    fn test_threshold_metadata_drives_finalize() {
        let mut result = EvalResult::new(2, fixed_config(Verbosity::Standard)).unwrap();
        result.add_row(&[0.4, 0.1], &[1, 0]).unwrap();
        result.set_meta(META_THRESHOLD, "0.3").unwrap();
        result.set_meta(META_VERBOSITY, "minimal").unwrap();
        result.finalize().unwrap();

        assert_eq!(result.meta(META_THRESHOLD), Some("0.3"));
        assert_eq!(result.meta(META_THRESHOLD_RESOLVED), Some("0.3"));
        assert_eq!(result.meta(META_VERBOSITY), Some("minimal"));
        assert_eq!(result.metric(names::EXACT_MATCH), Some(1.0));
        assert!(result.metric(names::AUROC_MACRO).is_none());
    }

    #[test]
    fn test_reserved_metadata_is_validated() {
        let mut result = EvalResult::new(2, fixed_config(Verbosity::Standard)).unwrap();
        let err = result.set_meta(META_THRESHOLD, "PCutX").unwrap_err();
        assert_eq!(err.category(), "invalid_parameter");
        assert!(result.set_meta(META_THRESHOLD, "[0.1,0.2,0.3]").is_err());
        assert!(result.set_meta(META_VERBOSITY, "loud").is_err());
        assert!(result.set_meta(META_TASK, "multi_target").is_err());
        assert!(result.set_meta(META_THRESHOLD_RESOLVED, "0.5").is_err());

        assert_eq!(result.meta(META_THRESHOLD), Some("0.5"));
        assert_eq!(result.meta(META_TASK), Some("multi_label"));
        assert_eq!(result.config().threshold, ThresholdSpec::Fixed(0.5));
    }

    #[test]
    fn test_row_validation() {
        let mut result = EvalResult::new(2, fixed_config(Verbosity::Standard)).unwrap();
        assert!(matches!(
            result.add_row(&[0.1], &[1, 0]),
            Err(EvalError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            result.add_row(&[0.1, 0.2], &[1, 2]),
            Err(EvalError::InvalidLabel { row: 0, column: 1, value: 2 })
        ));
        assert_eq!(result.num_rows(), 0);
        assert!(EvalResult::new(0, EvalConfig::default()).is_err());
    }

    #[test]
    fn test_pcut_requires_target() {
        let config = EvalConfigBuilder::new().parallel(false).build().unwrap();
        let mut result = EvalResult::new(2, config.clone()).unwrap();
        result.add_row(&[0.9, 0.4], &[1, 0]).unwrap();
        assert_eq!(result.finalize().unwrap_err().category(), "calibration");

        let target = CalibrationTarget {
            cardinality: 1.0,
            per_label: vec![0.5, 0.5],
        };
        let mut result = EvalResult::new(2, config)
            .unwrap()
            .with_calibration_target(target)
            .unwrap();
        result.add_row(&[0.9, 0.4], &[1, 0]).unwrap();
        result.add_row(&[0.3, 0.8], &[0, 1]).unwrap();
        result.finalize().unwrap();
        assert_eq!(result.threshold(), Some(&Threshold::Global(0.4)));
        assert_eq!(result.metric(names::EXACT_MATCH), Some(1.0));
    }

    #[test]
    fn test_verbosity_controls_outputs() {
        let truth = LabelMatrix::from_rows(&[vec![1, 0], vec![0, 1]]).unwrap();
        let confidences = ConfidenceMatrix::from_rows(&[vec![0.9, 0.2], vec![0.1, 0.8]]).unwrap();

        let mut minimal = EvalResult::from_matrices(&truth, &confidences, fixed_config(Verbosity::Minimal)).unwrap();
        minimal.finalize().unwrap();
        assert!(minimal.metric(names::EXACT_MATCH).is_some());
        assert!(minimal.metric(names::AUROC_MACRO).is_none());
        assert!(minimal.vectors().is_empty());

        let mut full = EvalResult::from_matrices(&truth, &confidences, fixed_config(Verbosity::Full)).unwrap();
        full.finalize().unwrap();
        assert_eq!(full.vector(names::THRESHOLD_PER_LABEL), Some(&[0.5, 0.5][..]));
        assert_eq!(full.vector(names::F1_PER_LABEL), Some(&[1.0, 1.0][..]));
        assert_eq!(full.curves().map(|c| c.per_label.len()), Some(2));
    }

    #[test]
    fn test_multi_target_rounds_predictions() {
        let config = EvalConfigBuilder::new()
            .task(TaskKind::MultiTarget)
            .verbosity(Verbosity::Full)
            .parallel(false)
            .build()
            .unwrap();
        let mut result = EvalResult::new(3, config).unwrap();
        result.add_row(&[2.1, 0.2, 1.0], &[2, 0, 1]).unwrap();
        result.add_row(&[0.0, 3.4, 1.0], &[0, 3, 2]).unwrap();
        result.finalize().unwrap();

        assert_eq!(result.metric(names::EXACT_MATCH), Some(0.5));
        assert!(result.metric(names::JACCARD_INDEX).is_none());
        assert!(result.threshold().is_none());
        assert!(result.curves().is_none());
    }

    #[test]
    fn test_display_and_json() {
        let mut result = EvalResult::new(2, fixed_config(Verbosity::Standard))
            .unwrap()
            .with_run_type(RunType::TrainTest)
            .unwrap();
        result.add_row(&[0.9, 0.1], &[1, 0]).unwrap();
        result.finalize().unwrap();

        let text = result.to_string();
        assert!(text.contains("run_type"));
        assert!(text.contains("train_test"));
        assert!(text.contains("exact_match"));

        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["metrics"]["exact_match"], 1.0);
        assert_eq!(json["metadata"]["threshold"], "0.5");
    }
}
