//! Error types for cartboost operations.
//!
//! Hyperparameter and input problems are raised eagerly, before any training
//! work starts. Numeric degeneracies during boosting are not errors: they end
//! training early and leave a usable ensemble behind.

use thiserror::Error;

/// Main error type for cartboost operations.
///
/// # Examples
///
/// ```
/// use cartboost::error::CartboostError;
///
/// let err = CartboostError::DimensionMismatch {
///     expected: "labels=100".to_string(),
///     actual: "90".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum CartboostError {
    /// Malformed dataset or call arguments.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error description
        message: String,
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

    /// Sample, label or feature counts don't line up.
    #[error("Input dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Inference attempted before a successful training run.
    #[error("{model} is not fitted, call train() first")]
    NotFitted {
        /// Name of the estimator
        model: &'static str,
    },
}

impl From<&str> for CartboostError {
    fn from(msg: &str) -> Self {
        CartboostError::InvalidInput {
            message: msg.to_string(),
        }
    }
}

impl From<String> for CartboostError {
    fn from(message: String) -> Self {
        CartboostError::InvalidInput { message }
    }
}

impl CartboostError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(
        param: &str,
        value: impl ToString,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::InvalidInput {
            message: format!("empty input: {context}"),
        }
    }

    /// Create a not-fitted error for the named model
    #[must_use]
    pub fn not_fitted(model: &'static str) -> Self {
        Self::NotFitted { model }
    }

    /// Whether this error signals use of an untrained model.
    #[must_use]
    pub fn is_not_fitted(&self) -> bool {
        matches!(self, Self::NotFitted { .. })
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, CartboostError>;
