//! Constant-prediction baselines.
//!
//! [`DummyRegressor`] ignores the features and predicts one value learned
//! from the targets. Gradient boosting uses it as the default starting
//! model, before any booster is fit.

use crate::data::Labeled;
use crate::error::{CartboostError, Result};
use crate::primitives::Matrix;
use crate::traits::Learner;
use serde::{Deserialize, Serialize};

/// How the constant is derived from the training targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum DummyStrategy {
    /// Arithmetic mean of the targets.
    #[default]
    Mean,
    /// Median of the targets (mean of the two middle values for even counts).
    Median,
    /// A fixed value, independent of the targets.
    Constant(f32),
}

/// Regressor that always predicts the same value.
///
/// # Examples
///
/// ```
/// use cartboost::prelude::*;
///
/// let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
/// let data = Labeled::new(x.clone(), vec![1.0_f32, 2.0, 6.0]).unwrap();
///
/// let mut model = DummyRegressor::new();
/// model.train(&data).unwrap();
/// assert_eq!(model.predict(&x).unwrap(), vec![3.0; 3]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DummyRegressor {
    strategy: DummyStrategy,
    constant: Option<f32>,
}

impl DummyRegressor {
    /// Creates a mean-predicting regressor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: DummyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The fitted constant, if trained.
    #[must_use]
    pub fn constant(&self) -> Option<f32> {
        self.constant
    }
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl Learner for DummyRegressor {
    type Label = f32;
    type Prediction = f32;

    fn train(&mut self, dataset: &Labeled<f32>) -> Result<()> {
        let targets = dataset.labels();
        if targets.is_empty() {
            return Err(CartboostError::empty_input("training dataset"));
        }
        let value = match self.strategy {
            DummyStrategy::Mean => targets.iter().sum::<f32>() / targets.len() as f32,
            DummyStrategy::Median => median(targets),
            DummyStrategy::Constant(v) => v,
        };
        if !value.is_finite() {
            return Err("dummy regressor fitted a non-finite constant".into());
        }
        self.constant = Some(value);
        Ok(())
    }

    fn predict(&self, samples: &Matrix<f32>) -> Result<Vec<f32>> {
        let value = self
            .constant
            .ok_or_else(|| CartboostError::not_fitted("DummyRegressor"))?;
        Ok(vec![value; samples.n_rows()])
    }

    fn is_trained(&self) -> bool {
        self.constant.is_some()
    }
}
