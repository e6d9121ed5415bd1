//! Evaluation metrics for trained models.
//!
//! Regression metrics (R², MSE, MAE, RMSE), classification accuracy, and the
//! [`RegressionMetric`] selector used to monitor gradient boosting on its
//! holdout partition.

use crate::traits::Metric;
use serde::{Deserialize, Serialize};

/// Computes the coefficient of determination (R²).
///
/// R² = 1 - (`SS_res` / `SS_tot`)
///
/// where `SS_res` is the residual sum of squares and `SS_tot` is the total
/// sum of squares. Returns 0.0 when the targets have no variance.
///
/// # Examples
///
/// ```
/// use cartboost::metrics::r_squared;
///
/// let y_true = [3.0, -0.5, 2.0, 7.0];
/// let y_pred = [2.5, 0.0, 2.0, 8.0];
/// assert!(r_squared(&y_pred, &y_true) > 0.9);
/// ```
///
/// # Panics
///
/// Panics if the slices have different lengths.
#[must_use]
pub fn r_squared(y_pred: &[f32], y_true: &[f32]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    if y_true.is_empty() {
        return 0.0;
    }

    let y_mean = y_true.iter().sum::<f32>() / y_true.len() as f32;

    let ss_res: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    let ss_tot: f32 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }

    1.0 - (ss_res / ss_tot)
}

/// Computes the Mean Squared Error (MSE).
///
/// MSE = (1/n) * `Σ(y_true` - `y_pred)²`
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
#[must_use]
pub fn mse(y_pred: &[f32], y_true: &[f32]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let sum_sq_error: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    sum_sq_error / y_true.len() as f32
}

/// Computes the Mean Absolute Error (MAE).
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
#[must_use]
pub fn mae(y_pred: &[f32], y_true: &[f32]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let sum_abs_error: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum();

    sum_abs_error / y_true.len() as f32
}

/// Computes the Root Mean Squared Error (RMSE).
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
#[must_use]
pub fn rmse(y_pred: &[f32], y_true: &[f32]) -> f32 {
    mse(y_pred, y_true).sqrt()
}

/// Fraction of predictions equal to the true label.
///
/// # Panics
///
/// Panics if the slices have different lengths.
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();
    correct as f32 / y_true.len() as f32
}

/// Regression validation metrics, oriented so that higher is better.
///
/// Error metrics are negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RegressionMetric {
    /// Coefficient of determination.
    #[default]
    RSquared,
    /// Negative mean squared error.
    NegMeanSquaredError,
    /// Negative mean absolute error.
    NegMeanAbsoluteError,
    /// Negative root mean squared error.
    NegRootMeanSquaredError,
}

impl Metric for RegressionMetric {
    fn score(&self, predictions: &[f32], labels: &[f32]) -> f32 {
        match self {
            Self::RSquared => r_squared(predictions, labels),
            Self::NegMeanSquaredError => -mse(predictions, labels),
            Self::NegMeanAbsoluteError => -mae(predictions, labels),
            Self::NegRootMeanSquaredError => -rmse(predictions, labels),
        }
    }
}

#[cfg(test)]
#[path = "tests_regression_contract.rs"]
mod tests_regression_contract;
