//! Error types for abandono operations.
//!
//! Provides typed context for failures across the pipeline: malformed
//! input tables, shape mismatches, unfitted transformers, and job
//! failures reported by the platform boundary.

use std::fmt;

/// Main error type for abandono operations.
///
/// # Examples
///
/// ```
/// use abandono::error::AbandonoError;
///
/// let err = AbandonoError::ShapeMismatch {
///     expected: "7043 rows".to_string(),
///     actual: "7032 rows".to_string(),
/// };
/// assert!(err.to_string().contains("shape mismatch"));
/// ```
#[derive(Debug)]
pub enum AbandonoError {
    /// Input table does not match the expected column layout.
    SchemaMismatch {
        /// Expected column description
        expected: String,
        /// What was found in the input
        actual: String,
    },

    /// A cell could not be parsed as the column's type.
    ParseCell {
        /// Column name
        column: String,
        /// Zero-based row index in the source table
        row: usize,
        /// Raw cell content
        value: String,
    },

    /// Row/column counts don't line up for the operation.
    ShapeMismatch {
        /// Expected shape description
        expected: String,
        /// Actual shape found
        actual: String,
    },

    /// A category seen at transform time was absent during fit.
    UnknownCategory {
        /// Source column name
        column: String,
        /// The unseen category value
        value: String,
    },

    /// Transformer or model used before fitting.
    NotFitted {
        /// Component name
        component: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A platform job reached the Failed terminal state.
    JobFailed {
        /// Job name
        job: String,
        /// Failure reason reported by the platform
        reason: String,
    },

    /// A model artifact with this name already exists (artifacts are
    /// created once and never mutated).
    ArtifactExists {
        /// Model name
        name: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for AbandonoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonoError::SchemaMismatch { expected, actual } => {
                write!(f, "Schema mismatch: expected {expected}, got {actual}")
            }
            AbandonoError::ParseCell { column, row, value } => {
                write!(
                    f,
                    "Cannot parse cell in column '{column}', row {row}: {value:?}"
                )
            }
            AbandonoError::ShapeMismatch { expected, actual } => {
                write!(f, "Data shape mismatch: expected {expected}, got {actual}")
            }
            AbandonoError::UnknownCategory { column, value } => {
                write!(
                    f,
                    "Unknown category {value:?} in column '{column}' (not seen during fit)"
                )
            }
            AbandonoError::NotFitted { component } => {
                write!(f, "{component} not fitted. Call fit() first.")
            }
            AbandonoError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter {param}={value}: must satisfy {constraint}"
                )
            }
            AbandonoError::JobFailed { job, reason } => {
                write!(f, "Job '{job}' failed: {reason}")
            }
            AbandonoError::ArtifactExists { name } => {
                write!(f, "Model artifact '{name}' already exists and is immutable")
            }
            AbandonoError::Io(e) => write!(f, "I/O error: {e}"),
            AbandonoError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            AbandonoError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AbandonoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AbandonoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AbandonoError {
    fn from(e: std::io::Error) -> Self {
        AbandonoError::Io(e)
    }
}

impl From<String> for AbandonoError {
    fn from(msg: String) -> Self {
        AbandonoError::Other(msg)
    }
}

impl From<&str> for AbandonoError {
    fn from(msg: &str) -> Self {
        AbandonoError::Other(msg.to_string())
    }
}

impl From<serde_json::Error> for AbandonoError {
    fn from(e: serde_json::Error) -> Self {
        AbandonoError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for AbandonoError {
    fn from(e: bincode::Error) -> Self {
        AbandonoError::Serialization(e.to_string())
    }
}

/// Result type alias for abandono operations.
pub type Result<T> = std::result::Result<T, AbandonoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_schema_mismatch() {
        let err = AbandonoError::SchemaMismatch {
            expected: "21 columns".to_string(),
            actual: "20 columns".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("21 columns"));
        assert!(msg.contains("20 columns"));
    }

    #[test]
    fn test_display_unknown_category() {
        let err = AbandonoError::UnknownCategory {
            column: "Contract".to_string(),
            value: "Decade".to_string(),
        };
        assert!(err.to_string().contains("Contract"));
        assert!(err.to_string().contains("Decade"));
    }

    #[test]
    fn test_display_not_fitted() {
        let err = AbandonoError::NotFitted {
            component: "OneHotEncoder".to_string(),
        };
        assert!(err.to_string().contains("fit()"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AbandonoError = io.into();
        assert!(matches!(err, AbandonoError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_str() {
        let err: AbandonoError = "something odd".into();
        assert_eq!(err.to_string(), "something odd");
    }

    #[test]
    fn test_job_failed_carries_reason() {
        let err = AbandonoError::JobFailed {
            job: "churn-train-01".to_string(),
            reason: "duplicate model name".to_string(),
        };
        assert!(err.to_string().contains("churn-train-01"));
        assert!(err.to_string().contains("duplicate model name"));
    }
}
