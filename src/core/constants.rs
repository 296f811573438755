//! Sentinels, metadata keys and configuration defaults.

use crate::core::types::LabelValue;

/// Truth entry meaning "not supervised at this position".
pub const MISSING: LabelValue = -1;

/// Token selecting global proportional-cut calibration.
pub const PCUT_GLOBAL_TOKEN: &str = "PCut1";

/// Token selecting per-label proportional-cut calibration.
pub const PCUT_PER_LABEL_TOKEN: &str = "PCutL";

/// Default number of decimals when rendering "mean ± stdev".
pub const DEFAULT_DECIMALS: usize = 3;

/// Metadata key holding the threshold specification string.
pub const META_THRESHOLD: &str = "threshold";

/// Metadata key holding the threshold actually applied after calibration.
pub const META_THRESHOLD_RESOLVED: &str = "threshold_resolved";

/// Metadata key holding the verbosity level.
pub const META_VERBOSITY: &str = "verbosity";

/// Metadata key holding the run-type tag.
pub const META_RUN_TYPE: &str = "run_type";

/// Metadata key holding the task kind.
pub const META_TASK: &str = "task";

/// Environment variable overriding the threshold specification.
pub const ENV_THRESHOLD: &str = "MLEVAL_THRESHOLD";

/// Environment variable overriding the verbosity level.
pub const ENV_VERBOSITY: &str = "MLEVAL_VERBOSITY";

/// Environment variable overriding the task kind.
pub const ENV_TASK: &str = "MLEVAL_TASK";

/// Environment variable toggling parallel metric evaluation.
pub const ENV_PARALLEL: &str = "MLEVAL_PARALLEL";

/// Library version
pub const MULTILABEL_EVAL_VERSION: &str = env!("CARGO_PKG_VERSION");
