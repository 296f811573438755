//! Evaluation configuration and its builder.

use crate::config::threshold::ThresholdSpec;
use crate::core::constants::*;
use crate::core::error::{EvalError, Result};
use crate::core::types::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings that control how a result is finalized and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Threshold specification applied at finalization
    pub threshold: ThresholdSpec,
    /// Amount of detail computed
    pub verbosity: Verbosity,
    /// Multi-label or multi-target evaluation
    pub task: TaskKind,
    /// Evaluate independent metrics concurrently
    pub parallel: bool,
    /// Decimals used when rendering aggregated "mean ± stdev" strings
    pub decimals: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdSpec::default(),
            verbosity: Verbosity::default(),
            task: TaskKind::default(),
            parallel: true,
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl EvalConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        match &self.threshold {
            ThresholdSpec::Fixed(t) if !t.is_finite() => {
                return Err(EvalError::invalid_parameter(
                    "threshold",
                    t.to_string(),
                    "must be finite",
                ));
            }
            ThresholdSpec::FixedPerLabel(ts) if ts.is_empty() => {
                return Err(EvalError::invalid_parameter(
                    "threshold",
                    "[]",
                    "per-label threshold list is empty",
                ));
            }
            ThresholdSpec::FixedPerLabel(ts) if ts.iter().any(|t| !t.is_finite()) => {
                return Err(EvalError::invalid_parameter(
                    "threshold",
                    self.threshold.to_string(),
                    "every per-label threshold must be finite",
                ));
            }
            _ => {}
        }

        if self.task == TaskKind::MultiTarget && self.threshold != ThresholdSpec::default() {
            log::warn!(
                "threshold '{}' is ignored for multi-target evaluation",
                self.threshold
            );
        }

        if self.decimals > 15 {
            return Err(EvalError::invalid_parameter(
                "decimals",
                self.decimals.to_string(),
                "must be at most 15",
            ));
        }

        Ok(())
    }

    /// Load configuration from a `.toml` or `.json` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: EvalConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(EvalError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| EvalError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(EvalError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from environment variables, starting from defaults.
    pub fn load_from_environment() -> Result<Self> {
        let mut config = EvalConfig::default();

        if let Ok(val) = std::env::var(ENV_THRESHOLD) {
            config.threshold = val.parse()?;
        }
        if let Ok(val) = std::env::var(ENV_VERBOSITY) {
            config.verbosity = val.parse()?;
        }
        if let Ok(val) = std::env::var(ENV_TASK) {
            config.task = val.parse()?;
        }
        if let Ok(val) = std::env::var(ENV_PARALLEL) {
            config.parallel = val
                .trim()
                .parse()
                .map_err(|_| EvalError::config(format!("Invalid {}: {}", ENV_PARALLEL, val)))?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone)]
pub struct EvalConfigBuilder {
    config: EvalConfig,
    validation_errors: Vec<String>,
}

impl EvalConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        EvalConfigBuilder {
            config: EvalConfig::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the threshold specification
    pub fn threshold(mut self, threshold: ThresholdSpec) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Parse and set the threshold specification
    pub fn threshold_str(mut self, threshold: &str) -> Self {
        match threshold.parse() {
            Ok(spec) => self.config.threshold = spec,
            Err(e) => self.validation_errors.push(e.to_string()),
        }
        self
    }

    /// Set the verbosity level
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    /// Set the task kind
    pub fn task(mut self, task: TaskKind) -> Self {
        self.config.task = task;
        self
    }

    /// Enable or disable parallel metric evaluation
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the number of decimals for aggregated output
    pub fn decimals(mut self, decimals: usize) -> Self {
        if decimals > 15 {
            self.validation_errors
                .push("decimals must be at most 15".to_string());
        }
        self.config.decimals = decimals;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EvalConfig> {
        if !self.validation_errors.is_empty() {
            return Err(EvalError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
