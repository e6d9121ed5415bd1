//! Decision tree algorithms.
//!
//! This module implements:
//! - CART (Classification and Regression Trees) with pluggable impurity
//!   criteria (Gini, entropy, variance, mean absolute deviation)
//! - Extremely randomized ("extra") trees via [`Splitter::Random`]
//! - Impurity-based feature importances
//!
//! # Example
//!
//! ```
//! use cartboost::prelude::*;
//!
//! // Training data (simple 2D binary classification)
//! let x = Matrix::from_vec(4, 2, vec![
//!     0.0, 0.0,  // class 0
//!     0.0, 1.0,  // class 0
//!     1.0, 0.0,  // class 1
//!     1.0, 1.0,  // class 1
//! ]).expect("Matrix creation should succeed");
//! let y = vec![0, 0, 1, 1];
//!
//! let mut tree = DecisionTreeClassifier::new().with_max_depth(3);
//! tree.fit(&x, &y).expect("fit should succeed");
//!
//! let predictions = tree.predict(&x).expect("tree is fitted");
//! assert_eq!(predictions, y);
//! ```

mod builder;
mod classifier;
pub mod criterion;
mod importance;
mod regressor;

pub use builder::{MaxFeatures, Splitter, TreeParams, IMPURITY_TOLERANCE};
pub use classifier::DecisionTreeClassifier;
pub use criterion::{ClassDistribution, ClassificationCriterion, RegressionCriterion, SplitCriterion};
pub use importance::FeatureImportances;
pub use regressor::DecisionTreeRegressor;

pub(crate) use builder::{seeded_rng, CartBuilder};

use crate::data::{goes_left, ColumnType};
use serde::{Deserialize, Serialize};

/// Internal decision node.
///
/// Contains a split condition (feature and threshold) and the two subtrees
/// it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split<O> {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold for continuous features, category code for categorical ones
    pub threshold: f32,
    /// How `threshold` is compared
    pub column_type: ColumnType,
    /// Impurity of the samples that reached this node
    pub impurity: f32,
    /// Weighted impurity of the two child groups
    pub split_impurity: f32,
    /// Number of training samples that reached this node
    pub n_samples: usize,
    /// Samples with `value < threshold` (or `value == category`)
    pub left: Box<TreeNode<O>>,
    /// All other samples
    pub right: Box<TreeNode<O>>,
}

/// Leaf node holding a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf<O> {
    /// Class distribution (classification) or mean target (regression)
    pub outcome: O,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// A node in a decision tree (either decision node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode<O> {
    /// Internal decision node with split condition
    Split(Split<O>),
    /// Leaf node with prediction
    Leaf(Leaf<O>),
}

impl<O> TreeNode<O> {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of leaves under this node.
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Split(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    /// Number of nodes (decision and leaf) under this node, itself included.
    pub fn n_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Split(node) => 1 + node.left.n_nodes() + node.right.n_nodes(),
        }
    }

    /// Training samples that reached this node.
    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf(leaf) => leaf.n_samples,
            TreeNode::Split(node) => node.n_samples,
        }
    }

    /// Walks from this node to the leaf that `sample` falls into.
    ///
    /// # Panics
    ///
    /// Panics if `sample` is shorter than a split's feature index.
    pub fn leaf_for(&self, sample: &[f32]) -> &Leaf<O> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf,
                TreeNode::Split(internal) => {
                    node = if goes_left(
                        internal.column_type,
                        sample[internal.feature_idx],
                        internal.threshold,
                    ) {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
