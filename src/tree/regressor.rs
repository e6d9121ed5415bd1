//! CART regression tree.

use super::{
    seeded_rng, CartBuilder, FeatureImportances, MaxFeatures, RegressionCriterion, Splitter,
    TreeNode, TreeParams,
};
use crate::data::Labeled;
use crate::error::{CartboostError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::{Learner, RanksFeatures};
use serde::{Deserialize, Serialize};

/// Decision tree regressor using the CART algorithm.
///
/// Uses weighted variance (or mean absolute deviation) as the split
/// criterion. Leaf nodes predict the weighted mean of their targets.
///
/// # Examples
///
/// ```
/// use cartboost::prelude::*;
///
/// let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]).unwrap();
/// let y = Vector::from_slice(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]);
///
/// let mut tree = DecisionTreeRegressor::new().with_max_depth(2);
/// tree.fit(&x, &y).unwrap();
/// let pred = tree.predict(&x).unwrap();
/// assert!((pred[0] - 1.0).abs() < 1e-6);
/// assert!((pred[5] - 5.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    tree: Option<TreeNode<f32>>,
    params: TreeParams,
    criterion: RegressionCriterion,
    random_state: Option<u64>,
    n_features: Option<usize>,
    importances: Option<FeatureImportances>,
}

impl DecisionTreeRegressor {
    /// Creates a new decision tree regressor with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            params: TreeParams::default(),
            criterion: RegressionCriterion::Variance,
            random_state: None,
            n_features: None,
            importances: None,
        }
    }

    /// Creates an extremely randomized regression tree (all features, one
    /// random threshold each).
    #[must_use]
    pub fn extra_tree() -> Self {
        Self::new()
            .with_splitter(Splitter::Random)
            .with_max_features(MaxFeatures::All)
    }

    /// Sets the maximum depth of the tree.
    ///
    /// # Arguments
    ///
    /// * `depth` - Maximum depth (root has depth 0)
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.params.max_depth = Some(depth);
        self
    }

    /// Sets the minimum number of samples required to split an internal node.
    ///
    /// # Arguments
    ///
    /// * `min_samples` - Minimum samples to split (must be >= 2)
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.params.min_samples_split = min_samples;
        self
    }

    /// Sets the minimum number of samples required to be at a leaf node.
    ///
    /// # Arguments
    ///
    /// * `min_samples` - Minimum samples per leaf (must be >= 1)
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.params.min_samples_leaf = min_samples;
        self
    }

    /// Sets the minimum weighted impurity decrease a split must achieve.
    #[must_use]
    pub fn with_min_impurity_decrease(mut self, decrease: f32) -> Self {
        self.params.min_impurity_decrease = decrease;
        self
    }

    /// Sets how many features are considered at each node.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.params.max_features = max_features;
        self
    }

    /// Sets the split search strategy.
    #[must_use]
    pub fn with_splitter(mut self, splitter: Splitter) -> Self {
        self.params.splitter = splitter;
        self
    }

    /// Sets the impurity criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: RegressionCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Seeds feature sampling and random thresholds.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fits the decision tree to training data.
    ///
    /// # Arguments
    ///
    /// * `x` - Training features (n_samples × n_features)
    /// * `y` - Training target values (n_samples continuous values)
    ///
    /// # Errors
    ///
    /// Returns an error if the data is invalid.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let dataset = Labeled::new(x.clone(), y.as_slice().to_vec())?;
        self.train_weighted(&dataset, None)
    }

    /// Fits the tree with optional per-sample weights (uniform if `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if the data, weights or hyperparameters are invalid.
    pub fn train_weighted(&mut self, dataset: &Labeled<f32>, weights: Option<&[f32]>) -> Result<()> {
        if dataset.labels().iter().any(|y| !y.is_finite()) {
            return Err("regression targets must be finite".into());
        }
        let rng = seeded_rng(self.random_state);
        let builder = CartBuilder::new(self.criterion, &self.params, dataset, weights, rng)?;
        let (root, importances) = builder.build();

        self.n_features = Some(dataset.n_cols());
        self.importances = Some(importances);
        self.tree = Some(root);
        Ok(())
    }

    /// Computes the R² score on test data.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is not fitted or shapes disagree.
    pub fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f32> {
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(CartboostError::dimension_mismatch("targets", predictions.len(), y.len()));
        }
        Ok(crate::metrics::r_squared(&predictions, y.as_slice()))
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode<f32>> {
        self.tree.as_ref()
    }

    /// Depth of the fitted tree, 0 when unfitted.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tree.as_ref().map_or(0, TreeNode::depth)
    }

    /// Number of leaves in the fitted tree, 0 when unfitted.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.tree.as_ref().map_or(0, TreeNode::n_leaves)
    }

    /// Number of nodes in the fitted tree, 0 when unfitted.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.tree.as_ref().map_or(0, TreeNode::n_nodes)
    }

    /// Current hyperparameters.
    #[must_use]
    pub fn params(&self) -> &TreeParams {
        &self.params
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Learner for DecisionTreeRegressor {
    type Label = f32;
    type Prediction = f32;

    fn train(&mut self, dataset: &Labeled<f32>) -> Result<()> {
        self.train_weighted(dataset, None)
    }

    fn predict(&self, samples: &Matrix<f32>) -> Result<Vec<f32>> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| CartboostError::not_fitted("DecisionTreeRegressor"))?;
        if let Some(expected) = self.n_features {
            if samples.n_cols() != expected {
                return Err(CartboostError::dimension_mismatch(
                    "features",
                    expected,
                    samples.n_cols(),
                ));
            }
        }
        Ok((0..samples.n_rows())
            .map(|row| tree.leaf_for(samples.row_slice(row)).outcome)
            .collect())
    }

    fn is_trained(&self) -> bool {
        self.tree.is_some()
    }

    fn set_random_state(&mut self, seed: u64) {
        self.random_state = Some(seed);
    }
}

impl RanksFeatures for DecisionTreeRegressor {
    fn importance_totals(&self) -> Result<FeatureImportances> {
        self.importances
            .clone()
            .ok_or_else(|| CartboostError::not_fitted("DecisionTreeRegressor"))
    }
}
