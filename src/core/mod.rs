//! Core infrastructure for the evaluation engine.
//!
//! - [`types`]: Fundamental aliases and enumerations
//! - [`constants`]: Sentinels, metadata keys and defaults
//! - [`error`]: Error type and `Result` alias
//! - [`matrix`]: Validated truth/confidence matrices and binarization
//!
//! ```rust
//! use multilabel_eval::core::{
//!     constants::MISSING,
//!     error::Result,
//!     matrix::{LabelMatrix, Threshold},
//! };
//!
//! let truth = LabelMatrix::from_rows(&[vec![1, 0, MISSING]])?;
//! assert_eq!(truth.num_observed(), 2);
//! assert_eq!(Threshold::Global(0.5).for_label(2), Some(0.5));
//! # Ok::<(), multilabel_eval::EvalError>(())
//! ```

pub mod constants;
pub mod error;
pub mod matrix;
pub mod types;

pub use constants::*;
pub use error::{EvalError, Result};
pub use matrix::{binarize, round_predictions, ConfidenceMatrix, LabelMatrix, Threshold};
pub use types::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static CORE_INIT: Once = Once::new();
static CORE_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize logging. Safe to call more than once.
pub fn initialize_core() -> Result<()> {
    CORE_INIT.call_once(|| {
        initialize_logging();
        CORE_INITIALIZED.store(true, Ordering::SeqCst);
        log::info!("multilabel-eval {} initialized", MULTILABEL_EVAL_VERSION);
    });
    Ok(())
}

/// Whether [`initialize_core`] has run.
pub fn is_core_initialized() -> bool {
    CORE_INITIALIZED.load(Ordering::SeqCst)
}

fn initialize_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // Another logger may already be installed by the host application.
    let _ = env_logger::Builder::from_env(env).try_init();
}
