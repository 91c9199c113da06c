//! Error types for noshow operations.
//!
//! Every fallible step of the encode -> predict -> decide pipeline reports
//! through [`NoShowError`]. The CLI maps variants to exit codes.

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Main error type for noshow operations.
///
/// # Examples
///
/// ```
/// use noshow::error::NoShowError;
///
/// let err = NoShowError::InvalidInput {
///     field: "age".to_string(),
///     value: "130".to_string(),
///     constraint: "integer in 0..=100".to_string(),
/// };
/// assert!(err.to_string().contains("age"));
/// ```
#[derive(Error, Debug)]
pub enum NoShowError {
    /// A raw form value is out of range or not one of its allowed choices.
    #[error("Invalid input: {field} = {value:?}, expected {constraint}")]
    InvalidInput {
        /// Field name
        field: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// The classifier failed or returned a malformed result.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Model feature columns do not match the serving schema.
    #[error("Feature schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch {
        /// Expected schema description
        expected: String,
        /// Actual schema description
        actual: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Model file not found.
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    /// Invalid or corrupt model artifact.
    #[error("Invalid model format: {message}")]
    Format {
        /// Error description
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration file could not be read or holds invalid values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (permission denied, short read, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NoShowError {
    /// Create an invalid input error for a field.
    #[must_use]
    pub fn invalid_input(field: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Whether the caller may report the error and keep accepting input.
    ///
    /// Invalid input and inference failures only decline the current
    /// prediction; everything else happens while loading and is fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::Inference(_))
    }

    /// Get the CLI exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput { .. } => ExitCode::from(2),
            Self::ModelNotFound(_) => ExitCode::from(3),
            Self::Format { .. } | Self::SchemaMismatch { .. } | Self::Serialization(_) => {
                ExitCode::from(4)
            }
            Self::Inference(_) => ExitCode::from(5),
            Self::Config(_) => ExitCode::from(6),
            Self::DimensionMismatch { .. } | Self::InvalidHyperparameter { .. } | Self::Io(_) => {
                ExitCode::from(1)
            }
        }
    }
}

impl From<bincode::Error> for NoShowError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, NoShowError>;
