//! Core capability traits shared by trees and boosting ensembles.
//!
//! Orchestrators are generic over these traits: any [`Learner`] can serve as
//! the AdaBoost base learner or as a gradient-boosting booster, and any
//! [`Metric`] can drive early stopping.

use crate::data::Labeled;
use crate::error::Result;
use crate::primitives::Matrix;
use crate::tree::FeatureImportances;

/// Primary trait for supervised learners.
///
/// Implementors must be cheap to clone in their untrained state: ensembles
/// clone a configured template once per round to get a fresh, independent
/// learner.
///
/// # Examples
///
/// ```
/// use cartboost::prelude::*;
///
/// let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 5.0, 6.0]).unwrap();
/// let data = Labeled::new(x.clone(), vec![0_usize, 0, 1, 1]).unwrap();
///
/// let mut tree = DecisionTreeClassifier::new().with_max_depth(1);
/// tree.train(&data).unwrap();
/// assert_eq!(tree.predict(&x).unwrap(), vec![0, 0, 1, 1]);
/// ```
pub trait Learner {
    /// Training label type (`usize` classes or `f32` targets).
    type Label: Copy;
    /// Per-sample prediction type.
    type Prediction: Copy;

    /// Fits the learner to a labeled dataset, replacing any previous fit.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hyperparameters or malformed data.
    fn train(&mut self, dataset: &Labeled<Self::Label>) -> Result<()>;

    /// Predicts one value per row of `samples`.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before a successful `train`, or a dimension error
    /// when the feature count differs from training.
    fn predict(&self, samples: &Matrix<f32>) -> Result<Vec<Self::Prediction>>;

    /// Whether the learner is ready for inference.
    fn is_trained(&self) -> bool;

    /// Reseeds any internal random source before the next `train`.
    fn set_random_state(&mut self, _seed: u64) {}
}

/// Learners that can output a class distribution per sample.
pub trait Probabilistic: Learner {
    /// Probability of each class, in ascending class-label order.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before a successful `train`.
    fn proba(&self, samples: &Matrix<f32>) -> Result<Vec<Vec<f32>>>;
}

/// Learners that attribute impurity decrease to features.
pub trait RanksFeatures {
    /// Raw, unnormalized impurity decrease per feature.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before a successful `train`.
    fn importance_totals(&self) -> Result<FeatureImportances>;

    /// Normalized importances, summing to 1 when any split occurred.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before a successful `train`.
    fn feature_importances(&self) -> Result<Vec<f32>> {
        Ok(self.importance_totals()?.normalized())
    }
}

/// Learners that keep a per-round training trace.
pub trait Traced {
    /// Training loss recorded once per completed round.
    fn steps(&self) -> &[f32];

    /// Validation scores recorded once per completed round, if monitored.
    fn scores(&self) -> &[f32] {
        &[]
    }
}

/// Validation metric. Higher is better.
pub trait Metric {
    /// Scores `predictions` against ground truth `labels`.
    fn score(&self, predictions: &[f32], labels: &[f32]) -> f32;
}
