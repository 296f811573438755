//! Configuration management for evaluation runs.
//!
//! Configuration can be built programmatically with [`EvalConfigBuilder`],
//! loaded from a `.toml`/`.json` file, or read from `MLEVAL_*` environment
//! variables.

pub mod core;
pub mod threshold;

pub use self::core::{EvalConfig, EvalConfigBuilder};
pub use self::threshold::ThresholdSpec;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "multilabel-eval.toml";
