//! Averaging finalized results across folds or windows.

use crate::core::error::{EvalError, Result};
use crate::evaluation::result::EvalResult;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Mean and sample standard deviation of one metric across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    /// Arithmetic mean over runs
    pub mean: f64,
    /// Sample standard deviation (`n - 1`); 0 for a single run
    pub std_dev: f64,
    /// Value of every run, in run order
    pub values: Vec<f64>,
}

impl MetricSummary {
    /// Summarize the values of one metric. NaN in any run propagates.
    pub fn from_values(values: Vec<f64>) -> Self {
        let n = values.len();
        let mean = if n == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / n as f64
        };
        let std_dev = if n < 2 {
            0.0
        } else {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (n - 1) as f64).sqrt()
        };
        Self { mean, std_dev, values }
    }

    /// Render as `"mean ± stdev"`.
    pub fn format(&self, decimals: usize) -> String {
        format!("{:.*} ± {:.*}", decimals, self.mean, decimals, self.std_dev)
    }
}

/// Metrics of several runs reduced to their mean and spread.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedResult {
    /// Metadata of the first run
    pub metadata: BTreeMap<String, String>,
    /// Number of aggregated runs
    pub num_runs: usize,
    /// Summary per scalar metric
    pub summaries: BTreeMap<String, MetricSummary>,
    /// Element-wise mean of each per-label vector
    pub vectors: BTreeMap<String, Vec<f64>>,
    /// Decimals used by [`AggregatedResult::formatted`]
    pub decimals: usize,
}

fn describe_difference(expected: &BTreeSet<&str>, actual: &BTreeSet<&str>) -> String {
    let missing: Vec<&str> = expected.difference(actual).copied().collect();
    let extra: Vec<&str> = actual.difference(expected).copied().collect();
    format!("missing [{}], unexpected [{}]", missing.join(", "), extra.join(", "))
}

impl AggregatedResult {
    /// Aggregate finalized results that share one metric-name set.
    pub fn from_results(results: &[EvalResult]) -> Result<Self> {
        let first = results
            .first()
            .ok_or_else(|| EvalError::aggregation("no results to aggregate"))?;

        for (run, result) in results.iter().enumerate() {
            if !result.is_finalized() {
                return Err(EvalError::state(format!("result of run {} is not finalized", run)));
            }
        }

        let metric_names: BTreeSet<&str> = first.metrics().keys().map(String::as_str).collect();
        let vector_names: BTreeSet<&str> = first.vectors().keys().map(String::as_str).collect();
        for (run, result) in results.iter().enumerate().skip(1) {
            let names: BTreeSet<&str> = result.metrics().keys().map(String::as_str).collect();
            if names != metric_names {
                return Err(EvalError::aggregation(format!(
                    "run {} has a different metric set: {}",
                    run,
                    describe_difference(&metric_names, &names)
                )));
            }
            let names: BTreeSet<&str> = result.vectors().keys().map(String::as_str).collect();
            if names != vector_names {
                return Err(EvalError::aggregation(format!(
                    "run {} has a different per-label vector set: {}",
                    run,
                    describe_difference(&vector_names, &names)
                )));
            }
            for (name, values) in result.vectors() {
                let expected = first.vectors()[name].len();
                if values.len() != expected {
                    return Err(EvalError::aggregation(format!(
                        "run {} has {} entries for '{}', expected {}",
                        run,
                        values.len(),
                        name,
                        expected
                    )));
                }
            }
        }

        let summaries = metric_names
            .iter()
            .map(|&name| {
                let values = results.iter().map(|r| r.metrics()[name]).collect();
                (name.to_string(), MetricSummary::from_values(values))
            })
            .collect();

        let num_runs = results.len() as f64;
        let vectors = vector_names
            .iter()
            .map(|&name| {
                let mut sum = vec![0.0; first.vectors()[name].len()];
                for result in results {
                    for (acc, v) in sum.iter_mut().zip(&result.vectors()[name]) {
                        *acc += v;
                    }
                }
                (name.to_string(), sum.into_iter().map(|s| s / num_runs).collect())
            })
            .collect();

        log::info!(
            "aggregated {} runs over {} metrics",
            results.len(),
            metric_names.len()
        );

        Ok(Self {
            metadata: first.metadata().clone(),
            num_runs: results.len(),
            summaries,
            vectors,
            decimals: first.config().decimals,
        })
    }

    /// Summary of one metric.
    pub fn summary(&self, name: &str) -> Option<&MetricSummary> {
        self.summaries.get(name)
    }

    /// Mean of one metric.
    pub fn mean(&self, name: &str) -> Option<f64> {
        self.summary(name).map(|s| s.mean)
    }

    /// Every metric rendered as `"mean ± stdev"`.
    pub fn formatted(&self) -> BTreeMap<String, String> {
        self.summaries
            .iter()
            .map(|(name, summary)| (name.clone(), summary.format(self.decimals)))
            .collect()
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for AggregatedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.metadata {
            writeln!(f, "{:<28} {}", key, value)?;
        }
        writeln!(f, "{:<28} {}", "runs", self.num_runs)?;
        for (name, text) in self.formatted() {
            writeln!(f, "{:<28} {}", name, text)?;
        }
        for (name, values) in &self.vectors {
            let parts: Vec<String> = values
                .iter()
                .map(|v| format!("{:.*}", self.decimals, v))
                .collect();
            writeln!(f, "{:<28} [{}]", name, parts.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EvalConfigBuilder, ThresholdSpec};
    use crate::core::types::Verbosity;
    use crate::metrics::names;
    use approx::assert_abs_diff_eq;

    fn run(rows: &[(&[f64], &[i32])], verbosity: Verbosity) -> EvalResult {
        let config = EvalConfigBuilder::new()
            .threshold(ThresholdSpec::Fixed(0.5))
            .verbosity(verbosity)
            .parallel(false)
            .decimals(2)
            .build()
            .unwrap();
        let mut result = EvalResult::new(rows[0].0.len(), config).unwrap();
        for (c, y) in rows {
            result.add_row(c, y).unwrap();
        }
        result.finalize().unwrap();
        result
    }

    #[test]
    fn test_summary_statistics() {
        let summary = MetricSummary::from_values(vec![0.8, 0.9, 1.0]);
        assert_abs_diff_eq!(summary.mean, 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.std_dev, 0.1, epsilon = 1e-12);
        assert_eq!(summary.format(3), "0.900 ± 0.100");

        let single = MetricSummary::from_values(vec![0.5]);
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.format(1), "0.5 ± 0.0");
    }

    #[test]
    fn test_aggregate_runs() {
        let perfect = run(&[(&[0.9, 0.1], &[1, 0])], Verbosity::PerLabel);
        let wrong = run(&[(&[0.1, 0.9], &[1, 0])], Verbosity::PerLabel);
        let aggregated = AggregatedResult::from_results(&[perfect, wrong]).unwrap();

        assert_eq!(aggregated.num_runs, 2);
        assert_abs_diff_eq!(aggregated.mean(names::EXACT_MATCH).unwrap(), 0.5, epsilon = 1e-12);
        let std_dev = aggregated.summary(names::EXACT_MATCH).unwrap().std_dev;
        assert_abs_diff_eq!(std_dev, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_eq!(aggregated.formatted()[names::EXACT_MATCH], "0.50 ± 0.71");
        assert_eq!(aggregated.vectors[names::HAMMING_SCORE_PER_LABEL], vec![0.5, 0.5]);
        assert_eq!(aggregated.metadata.get("threshold").map(String::as_str), Some("0.5"));
    }

    #[test]
    fn test_mismatched_metric_sets() {
        let standard = run(&[(&[0.9, 0.1], &[1, 0])], Verbosity::Standard);
        let minimal = run(&[(&[0.9, 0.1], &[1, 0])], Verbosity::Minimal);
        let err = AggregatedResult::from_results(&[standard, minimal]).unwrap_err();
        assert_eq!(err.category(), "aggregation");
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_mismatched_vector_lengths() {
        let two = run(&[(&[0.9, 0.1], &[1, 0])], Verbosity::PerLabel);
        let three = run(&[(&[0.9, 0.1, 0.3], &[1, 0, 0])], Verbosity::PerLabel);
        assert!(AggregatedResult::from_results(&[two, three]).is_err());
    }

    #[test]
    fn test_empty_and_unfinalized() {
        assert!(AggregatedResult::from_results(&[]).is_err());
        let open = EvalResult::new(2, crate::config::EvalConfig::default()).unwrap();
        assert_eq!(AggregatedResult::from_results(&[open]).unwrap_err().category(), "state");
    }
}
