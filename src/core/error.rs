//! Error handling and error types for the evaluation engine.
//!
//! Shape and configuration problems are reported as [`EvalError`] values and
//! propagated with `?`. Degenerate statistics (a label column without
//! positives, an instance whose truth is entirely missing) are never errors:
//! the affected metric is reported as NaN instead.

use std::io;
use thiserror::Error;

/// Main error type for the evaluation library.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Matrix or vector shape mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape
        expected: String,
        /// Shape received
        actual: String,
    },

    /// A truth entry outside the allowed alphabet
    #[error("Invalid label value {value} at row {row}, column {column}")]
    InvalidLabel {
        /// Instance index
        row: usize,
        /// Label index
        column: usize,
        /// Offending value
        value: i32,
    },

    /// Threshold calibration could not produce a threshold
    #[error("Calibration error: {message}")]
    Calibration {
        /// Why calibration failed
        message: String,
    },

    /// Results could not be combined across folds or windows
    #[error("Aggregation error: {message}")]
    Aggregation {
        /// Why the results are incompatible
        message: String,
    },

    /// Operation not allowed in the current result state
    #[error("Invalid state: {message}")]
    State {
        /// Rejected operation
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serde_json error
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML error: {source}")]
    Toml {
        /// Underlying TOML parse error
        #[from]
        source: toml::de::Error,
    },
}

/// Type alias for Results using EvalError
pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        EvalError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        EvalError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        EvalError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid label error
    pub fn invalid_label(row: usize, column: usize, value: i32) -> Self {
        EvalError::InvalidLabel { row, column, value }
    }

    /// Create a calibration error
    pub fn calibration<S: Into<String>>(message: S) -> Self {
        EvalError::Calibration {
            message: message.into(),
        }
    }

    /// Create an aggregation error
    pub fn aggregation<S: Into<String>>(message: S) -> Self {
        EvalError::Aggregation {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state<S: Into<String>>(message: S) -> Self {
        EvalError::State {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Shape and configuration problems are fatal; calibration can be retried
    /// with a different target or a fixed threshold.
    pub fn is_recoverable(&self) -> bool {
        match self {
            EvalError::Config { .. } => false,
            EvalError::InvalidParameter { .. } => false,
            EvalError::DimensionMismatch { .. } => false,
            EvalError::InvalidLabel { .. } => false,
            EvalError::Calibration { .. } => true,
            EvalError::Aggregation { .. } => false,
            EvalError::State { .. } => false,
            EvalError::Io { .. } => false,
            EvalError::Json { .. } => false,
            EvalError::Toml { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            EvalError::Config { .. } => "config",
            EvalError::InvalidParameter { .. } => "invalid_parameter",
            EvalError::DimensionMismatch { .. } => "dimension_mismatch",
            EvalError::InvalidLabel { .. } => "invalid_label",
            EvalError::Calibration { .. } => "calibration",
            EvalError::Aggregation { .. } => "aggregation",
            EvalError::State { .. } => "state",
            EvalError::Io { .. } => "io",
            EvalError::Json { .. } => "json",
            EvalError::Toml { .. } => "toml",
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::EvalError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::EvalError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = EvalError::config("test configuration error");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());

        let err = EvalError::calibration("target out of range");
        assert_eq!(err.category(), "calibration");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_struct_fields_in_messages() {
        let err = EvalError::invalid_label(3, 1, 7);
        assert_eq!(err.to_string(), "Invalid label value 7 at row 3, column 1");

        let err = EvalError::dimension_mismatch("2 x 3", "2 x 4");
        assert!(matches!(&err, EvalError::DimensionMismatch { expected, actual } if expected == "2 x 3" && actual == "2 x 4"));
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("test error");
        assert!(matches!(err, EvalError::Config { .. }));

        let err = config_error!("bad threshold token: {}", "PCutX");
        assert!(err.to_string().contains("PCutX"));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(n: usize) -> Result<usize> {
            ensure!(n > 0, EvalError::invalid_parameter("n", n.to_string(), "must be positive"));
            Ok(n)
        }
        assert!(check(0).is_err());
        assert_eq!(check(3).unwrap(), 3);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = EvalError::dimension_mismatch("3 columns", "4 columns");
        assert_eq!(err.category(), "dimension_mismatch");
        let message = err.to_string();
        assert!(message.contains("expected 3 columns"));
        assert!(message.contains("got 4 columns"));
    }

    #[test]
    fn test_invalid_label_display() {
        let err = EvalError::invalid_label(2, 1, -7);
        assert_eq!(err.to_string(), "Invalid label value -7 at row 2, column 1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: EvalError = io_err.into();
        assert!(matches!(err, EvalError::Io { .. }));
        assert_eq!(err.category(), "io");
    }
}
