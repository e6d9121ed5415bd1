//! CART classification tree.

use super::{
    seeded_rng, CartBuilder, ClassDistribution, ClassificationCriterion, FeatureImportances,
    MaxFeatures, Splitter, TreeNode, TreeParams,
};
use crate::data::Labeled;
use crate::error::{CartboostError, Result};
use crate::primitives::Matrix;
use crate::traits::{Learner, Probabilistic, RanksFeatures};
use serde::{Deserialize, Serialize};

/// Decision tree classifier using the CART algorithm.
///
/// Leaves store the weighted class distribution of the samples that reached
/// them and predict its majority class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode<ClassDistribution>>,
    params: TreeParams,
    criterion: ClassificationCriterion,
    random_state: Option<u64>,
    /// Number of features the model was trained on (for validation)
    n_features: Option<usize>,
    classes: Vec<usize>,
    importances: Option<FeatureImportances>,
}

impl DecisionTreeClassifier {
    /// Creates a new decision tree classifier with default parameters.
    ///
    /// Gini impurity, exhaustive split search, unlimited depth.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            params: TreeParams::default(),
            criterion: ClassificationCriterion::Gini,
            random_state: None,
            n_features: None,
            classes: Vec::new(),
            importances: None,
        }
    }

    /// Creates an extremely randomized tree: one random threshold per
    /// feature, `sqrt(n_features)` features per node.
    #[must_use]
    pub fn extra_tree() -> Self {
        Self::new()
            .with_splitter(Splitter::Random)
            .with_max_features(MaxFeatures::Sqrt)
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
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.params.min_samples_split = min_samples;
        self
    }

    /// Sets the minimum number of samples required on each side of a split.
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
    pub fn with_criterion(mut self, criterion: ClassificationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Seeds feature sampling and random thresholds.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fits the tree to a continuous-feature matrix and class labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the data or hyperparameters are invalid.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let dataset = Labeled::new(x.clone(), y.to_vec())?;
        self.train_weighted(&dataset, None)
    }

    /// Fits the tree with optional per-sample weights (uniform if `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if the data, weights or hyperparameters are invalid.
    pub fn train_weighted(&mut self, dataset: &Labeled<usize>, weights: Option<&[f32]>) -> Result<()> {
        let rng = seeded_rng(self.random_state);
        let builder = CartBuilder::new(self.criterion, &self.params, dataset, weights, rng)?;
        let (root, importances) = builder.build();

        self.classes = dataset.possible_outcomes();
        self.n_features = Some(dataset.n_cols());
        self.importances = Some(importances);
        self.tree = Some(root);
        Ok(())
    }

    /// Fraction of correctly classified samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is not fitted or shapes disagree.
    pub fn score(&self, x: &Matrix<f32>, y: &[usize]) -> Result<f32> {
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(CartboostError::dimension_mismatch("labels", predictions.len(), y.len()));
        }
        Ok(crate::metrics::accuracy(&predictions, y))
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode<ClassDistribution>> {
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

    /// Class labels seen during training, ascending.
    #[must_use]
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Current hyperparameters.
    #[must_use]
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    fn fitted_tree(&self, x: &Matrix<f32>) -> Result<&TreeNode<ClassDistribution>> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| CartboostError::not_fitted("DecisionTreeClassifier"))?;
        if let Some(expected) = self.n_features {
            if x.n_cols() != expected {
                return Err(CartboostError::dimension_mismatch("features", expected, x.n_cols()));
            }
        }
        Ok(tree)
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Learner for DecisionTreeClassifier {
    type Label = usize;
    type Prediction = usize;

    fn train(&mut self, dataset: &Labeled<usize>) -> Result<()> {
        self.train_weighted(dataset, None)
    }

    fn predict(&self, samples: &Matrix<f32>) -> Result<Vec<usize>> {
        let tree = self.fitted_tree(samples)?;
        Ok((0..samples.n_rows())
            .map(|row| tree.leaf_for(samples.row_slice(row)).outcome.class_label)
            .collect())
    }

    fn is_trained(&self) -> bool {
        self.tree.is_some()
    }

    fn set_random_state(&mut self, seed: u64) {
        self.random_state = Some(seed);
    }
}

impl Probabilistic for DecisionTreeClassifier {
    fn proba(&self, samples: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        let tree = self.fitted_tree(samples)?;
        Ok((0..samples.n_rows())
            .map(|row| {
                let dist = &tree.leaf_for(samples.row_slice(row)).outcome;
                self.classes.iter().map(|&c| dist.probability(c)).collect()
            })
            .collect())
    }
}

impl RanksFeatures for DecisionTreeClassifier {
    fn importance_totals(&self) -> Result<FeatureImportances> {
        self.importances
            .clone()
            .ok_or_else(|| CartboostError::not_fitted("DecisionTreeClassifier"))
    }
}

