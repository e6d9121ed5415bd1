//! Tests for decision tree algorithms.

use super::*;
use crate::data::Labeled;
use crate::error::CartboostError;
use crate::primitives::{Matrix, Vector};
use crate::traits::{Learner, Probabilistic, RanksFeatures};

fn separable() -> (Matrix<f32>, Vec<usize>) {
    let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 5.0, 6.0]).expect("valid matrix");
    (x, vec![0, 0, 1, 1])
}

fn xor_like() -> (Matrix<f32>, Vec<usize>) {
    let x = Matrix::from_vec(
        8,
        2,
        vec![
            0.0, 0.0, 0.1, 0.2, 0.0, 1.0, 0.2, 0.9, 1.0, 0.0, 0.9, 0.1, 1.0, 1.0, 0.8, 0.9,
        ],
    )
    .expect("valid matrix");
    (x, vec![0, 0, 1, 1, 1, 1, 0, 0])
}

fn leaf_distribution(node: &TreeNode<ClassDistribution>) -> &ClassDistribution {
    match node {
        TreeNode::Leaf(leaf) => &leaf.outcome,
        TreeNode::Split(_) => panic!("expected a leaf"),
    }
}

fn assert_monotone<O>(node: &TreeNode<O>) {
    if let TreeNode::Split(split) = node {
        assert!(
            split.split_impurity <= split.impurity + 1e-6,
            "split impurity {} exceeds parent {}",
            split.split_impurity,
            split.impurity
        );
        assert_monotone(&split.left);
        assert_monotone(&split.right);
    }
}

#[test]
fn test_leaf_creation() {
    let leaf = Leaf {
        outcome: 2.5_f32,
        n_samples: 10,
    };
    assert_eq!(leaf.outcome, 2.5);
    assert_eq!(leaf.n_samples, 10);
}

#[test]
fn test_node_counts() {
    let leaf = |v: f32| Box::new(TreeNode::Leaf(Leaf { outcome: v, n_samples: 1 }));
    let tree = TreeNode::Split(Split {
        feature_idx: 0,
        threshold: 0.5,
        column_type: crate::data::ColumnType::Continuous,
        impurity: 0.25,
        split_impurity: 0.0,
        n_samples: 3,
        left: leaf(0.0),
        right: Box::new(TreeNode::Split(Split {
            feature_idx: 1,
            threshold: 1.5,
            column_type: crate::data::ColumnType::Continuous,
            impurity: 0.25,
            split_impurity: 0.0,
            n_samples: 2,
            left: leaf(1.0),
            right: leaf(2.0),
        })),
    });

    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.n_leaves(), 3);
    assert_eq!(tree.n_nodes(), 5);
    assert_eq!(tree.n_samples(), 3);
    assert_eq!(tree.leaf_for(&[0.0, 0.0]).outcome, 0.0);
    assert_eq!(tree.leaf_for(&[1.0, 1.0]).outcome, 1.0);
    assert_eq!(tree.leaf_for(&[1.0, 2.0]).outcome, 2.0);
}

#[test]
fn test_perfect_separation_single_split() {
    let (x, y) = separable();
    let mut tree = DecisionTreeClassifier::new().with_max_depth(1);
    tree.fit(&x, &y).expect("fit should succeed");

    let Some(TreeNode::Split(root)) = tree.root() else {
        panic!("expected a split at the root");
    };
    assert_eq!(root.feature_idx, 0);
    assert!(root.threshold > 2.0 && root.threshold < 5.0);
    assert!((root.threshold - 3.5).abs() < 1e-6);
    assert!(root.split_impurity.abs() < 1e-7);

    let left = leaf_distribution(&root.left);
    let right = leaf_distribution(&root.right);
    assert_eq!(left.class_label, 0);
    assert_eq!(right.class_label, 1);
    assert_eq!(left.probabilities, vec![(0, 1.0)]);
    assert_eq!(right.probabilities, vec![(1, 1.0)]);

    assert_eq!(tree.predict(&x).expect("fitted"), y);
}

#[test]
fn test_constant_labels_single_leaf() {
    let x = Matrix::from_vec(5, 2, (0..10).map(|v| v as f32).collect()).expect("valid matrix");
    let y = vec![3; 5];
    let mut tree = DecisionTreeClassifier::new().with_max_depth(10);
    tree.fit(&x, &y).expect("fit should succeed");

    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.n_leaves(), 1);
    assert_eq!(tree.n_nodes(), 1);
    assert_eq!(tree.predict(&x).expect("fitted"), y);
    assert_eq!(tree.feature_importances().expect("fitted"), vec![0.0, 0.0]);
}

#[test]
fn test_depth_bound() {
    let (x, y) = xor_like();
    for max_depth in 0..4 {
        let mut tree = DecisionTreeClassifier::new().with_max_depth(max_depth);
        tree.fit(&x, &y).expect("fit should succeed");
        assert!(tree.depth() <= max_depth);
    }
}

#[test]
fn test_unbounded_tree_fits_training_data() {
    let (x, y) = xor_like();
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("fit should succeed");
    assert!((tree.score(&x, &y).expect("fitted") - 1.0).abs() < 1e-6);
    assert_monotone(tree.root().expect("fitted"));
}

#[test]
fn test_entropy_criterion() {
    let (x, y) = xor_like();
    let mut tree = DecisionTreeClassifier::new().with_criterion(ClassificationCriterion::Entropy);
    tree.fit(&x, &y).expect("fit should succeed");
    assert_eq!(tree.predict(&x).expect("fitted"), y);
    assert_monotone(tree.root().expect("fitted"));
}

#[test]
fn test_predict_before_fit() {
    let (x, _) = separable();
    let tree = DecisionTreeClassifier::new();
    assert!(!tree.is_trained());
    let err = tree.predict(&x).unwrap_err();
    assert!(err.is_not_fitted());
    assert!(tree.proba(&x).unwrap_err().is_not_fitted());
    assert!(tree.feature_importances().unwrap_err().is_not_fitted());

    let reg = DecisionTreeRegressor::new();
    assert!(reg.predict(&x).unwrap_err().is_not_fitted());
}

#[test]
fn test_cardinality_mismatch() {
    let (x, _) = separable();
    let mut tree = DecisionTreeClassifier::new();
    let err = tree.fit(&x, &[0, 1]).unwrap_err();
    assert!(matches!(err, CartboostError::DimensionMismatch { .. }));
    assert!(!tree.is_trained());
}

#[test]
fn test_feature_count_checked_at_predict() {
    let (x, y) = separable();
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("fit should succeed");
    let wide = Matrix::from_vec(1, 2, vec![1.0, 2.0]).expect("valid matrix");
    assert!(matches!(
        tree.predict(&wide),
        Err(CartboostError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_invalid_hyperparameters_rejected() {
    let (x, y) = separable();
    let mut tree = DecisionTreeClassifier::new().with_min_samples_split(1);
    assert!(matches!(
        tree.fit(&x, &y),
        Err(CartboostError::InvalidHyperparameter { .. })
    ));
}

#[test]
fn test_min_samples_leaf_respected() {
    let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid matrix");
    let y = vec![0, 1, 1, 1, 1, 1];
    let mut tree = DecisionTreeClassifier::new().with_min_samples_leaf(2);
    tree.fit(&x, &y).expect("fit should succeed");

    fn check(node: &TreeNode<ClassDistribution>) {
        match node {
            TreeNode::Leaf(leaf) => assert!(leaf.n_samples >= 2),
            TreeNode::Split(split) => {
                check(&split.left);
                check(&split.right);
            }
        }
    }
    check(tree.root().expect("fitted"));
}

#[test]
fn test_min_impurity_decrease_prunes() {
    let (x, y) = xor_like();
    let mut tree = DecisionTreeClassifier::new().with_min_impurity_decrease(0.6);
    tree.fit(&x, &y).expect("fit should succeed");
    assert_eq!(tree.n_leaves(), 1);
}

#[test]
fn test_categorical_split() {
    // Column 0 is noise, column 1 holds category codes.
    let x = Matrix::from_vec(
        6,
        2,
        vec![0.5, 7.0, 0.1, 3.0, 0.4, 7.0, 0.3, 1.0, 0.2, 7.0, 0.6, 3.0],
    )
    .expect("valid matrix");
    let data = Labeled::new(x.clone(), vec![1_usize, 0, 1, 0, 1, 0])
        .and_then(|d| {
            d.with_column_types(vec![
                crate::data::ColumnType::Continuous,
                crate::data::ColumnType::Categorical,
            ])
        })
        .expect("valid dataset");

    let mut tree = DecisionTreeClassifier::new().with_max_depth(1);
    tree.train(&data).expect("fit should succeed");

    let Some(TreeNode::Split(root)) = tree.root() else {
        panic!("expected a split");
    };
    assert_eq!(root.feature_idx, 1);
    assert_eq!(root.column_type, crate::data::ColumnType::Categorical);
    assert!((root.threshold - 7.0).abs() < 1e-6);
    assert_eq!(tree.predict(&x).expect("fitted"), vec![1, 0, 1, 0, 1, 0]);
}

#[test]
fn test_weights_shift_majority() {
    let x = Matrix::from_vec(3, 1, vec![1.0, 1.0, 1.0]).expect("valid matrix");
    let data = Labeled::new(x.clone(), vec![0_usize, 1, 1]).expect("valid dataset");

    let mut tree = DecisionTreeClassifier::new();
    tree.train_weighted(&data, Some(&[10.0, 1.0, 1.0]))
        .expect("fit should succeed");
    assert_eq!(tree.predict(&x).expect("fitted"), vec![0, 0, 0]);

    let proba = tree.proba(&x).expect("fitted");
    assert!((proba[0][0] - 10.0 / 12.0).abs() < 1e-5);
    assert!((proba[0][1] - 2.0 / 12.0).abs() < 1e-5);
}

#[test]
fn test_invalid_weights_rejected() {
    let (x, y) = separable();
    let data = Labeled::new(x, y).expect("valid dataset");
    let mut tree = DecisionTreeClassifier::new();
    assert!(tree.train_weighted(&data, Some(&[1.0, 1.0])).is_err());
    assert!(tree.train_weighted(&data, Some(&[0.0; 4])).is_err());
    assert!(tree
        .train_weighted(&data, Some(&[1.0, -1.0, 1.0, 1.0]))
        .is_err());
}

#[test]
fn test_proba_rows_sum_to_one() {
    let (x, y) = xor_like();
    let mut tree = DecisionTreeClassifier::new().with_max_depth(1);
    tree.fit(&x, &y).expect("fit should succeed");
    assert_eq!(tree.classes(), &[0, 1]);
    for row in tree.proba(&x).expect("fitted") {
        assert_eq!(row.len(), 2);
        assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn test_feature_importances_normalized() {
    let (x, y) = xor_like();
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("fit should succeed");
    let importances = tree.feature_importances().expect("fitted");
    assert_eq!(importances.len(), 2);
    assert!((importances.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    assert!(importances.iter().all(|&v| v >= 0.0));
}

#[test]
fn test_extra_tree_reproducible_with_seed() {
    let (x, y) = xor_like();
    let mut a = DecisionTreeClassifier::extra_tree().with_random_state(42);
    let mut b = DecisionTreeClassifier::extra_tree().with_random_state(42);
    a.fit(&x, &y).expect("fit should succeed");
    b.fit(&x, &y).expect("fit should succeed");
    assert_eq!(a.root(), b.root());
    assert_eq!(a.params().splitter, Splitter::Random);
}

#[test]
fn test_extra_tree_thresholds_inside_range() {
    let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]).expect("valid matrix");
    let y = Vector::from_slice(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]);
    let mut tree = DecisionTreeRegressor::extra_tree()
        .with_max_depth(1)
        .with_random_state(9);
    tree.fit(&x, &y).expect("fit should succeed");

    let Some(TreeNode::Split(root)) = tree.root() else {
        panic!("expected a split");
    };
    assert!(root.threshold >= 1.0 && root.threshold < 12.0);
}

fn opposite_extremes() -> Matrix<f32> {
    Matrix::from_vec(2, 1, vec![-3e38, 3e38]).expect("valid matrix")
}

#[test]
fn test_extreme_values_split_between_neighbours() {
    let x = opposite_extremes();
    let y = vec![0, 1];

    let mut stump = DecisionTreeClassifier::new().with_max_depth(1);
    stump.fit(&x, &y).expect("fit should succeed");
    assert_eq!(stump.predict(&x).expect("fitted"), y);
    let Some(TreeNode::Split(root)) = stump.root() else {
        panic!("expected a split");
    };
    assert_eq!(root.threshold, 0.0);

    let mut unbounded = DecisionTreeClassifier::new();
    unbounded.fit(&x, &y).expect("fit should succeed");
    assert_eq!(unbounded.predict(&x).expect("fitted"), y);
    assert_eq!(unbounded.n_leaves(), 2);
}

#[test]
fn test_non_finite_feature_values_route_consistently() {
    let x = Matrix::from_vec(
        6,
        1,
        vec![f32::NEG_INFINITY, 1.0, 2.0, 10.0, f32::INFINITY, f32::NAN],
    )
    .expect("valid matrix");
    let y = vec![0, 0, 0, 1, 1, 1];
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("fit should succeed");

    assert_eq!(tree.predict(&x).expect("fitted"), y);
    let Some(TreeNode::Split(root)) = tree.root() else {
        panic!("expected a split");
    };
    assert!(root.threshold.is_finite());
    assert!(root.threshold > 2.0 && root.threshold <= 10.0);
}

#[test]
fn test_extra_tree_handles_extreme_range() {
    let x = opposite_extremes();

    let mut classifier = DecisionTreeClassifier::extra_tree().with_random_state(1);
    classifier.fit(&x, &[0, 1]).expect("fit should succeed");
    assert_eq!(classifier.predict(&x).expect("fitted"), vec![0, 1]);
    let Some(TreeNode::Split(root)) = classifier.root() else {
        panic!("expected a split");
    };
    assert!(root.threshold > -3e38 && root.threshold <= 3e38);

    let mut regressor = DecisionTreeRegressor::extra_tree().with_random_state(1);
    regressor
        .fit(&x, &Vector::from_slice(&[-1.0, 1.0]))
        .expect("fit should succeed");
    assert_eq!(regressor.predict(&x).expect("fitted"), vec![-1.0, 1.0]);
}

#[test]
fn test_regressor_step_function() {
    let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]).expect("valid matrix");
    let y = Vector::from_slice(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]);
    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit should succeed");

    assert_eq!(tree.depth(), 1);
    let pred = tree.predict(&x).expect("fitted");
    assert_eq!(pred, vec![1.0, 1.0, 1.0, 5.0, 5.0, 5.0]);
    assert!((tree.score(&x, &y).expect("fitted") - 1.0).abs() < 1e-6);
}

#[test]
fn test_regressor_leaf_is_weighted_mean() {
    let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("valid matrix");
    let data = Labeled::new(x.clone(), vec![0.0_f32, 4.0]).expect("valid dataset");
    let mut tree = DecisionTreeRegressor::new().with_max_depth(0);
    tree.train_weighted(&data, Some(&[3.0, 1.0]))
        .expect("fit should succeed");
    let pred = tree.predict(&x).expect("fitted");
    assert!((pred[0] - 1.0).abs() < 1e-6);
}

#[test]
fn test_regressor_mad_criterion_monotone() {
    let x = Matrix::from_vec(8, 1, (0..8).map(|v| v as f32).collect()).expect("valid matrix");
    let y = Vector::from_slice(&[0.0, 0.5, 1.0, 4.0, 4.5, 9.0, 9.5, 10.0]);
    let mut tree =
        DecisionTreeRegressor::new().with_criterion(RegressionCriterion::MeanAbsoluteDeviation);
    tree.fit(&x, &y).expect("fit should succeed");
    assert_monotone(tree.root().expect("fitted"));
}

#[test]
fn test_regressor_rejects_non_finite_targets() {
    let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("valid matrix");
    let y = Vector::from_slice(&[1.0, f32::NAN]);
    let mut tree = DecisionTreeRegressor::new();
    assert!(tree.fit(&x, &y).is_err());
}

#[test]
fn test_empty_dataset_rejected() {
    let x = Matrix::from_vec(0, 1, vec![]).expect("valid matrix");
    let mut tree = DecisionTreeClassifier::new();
    assert!(tree.fit(&x, &[]).is_err());
}

#[test]
fn test_params_serde_roundtrip() {
    let tree = DecisionTreeClassifier::new()
        .with_max_depth(4)
        .with_max_features(MaxFeatures::Fraction(0.5));
    let json = serde_json::to_string(tree.params()).expect("serialize");
    let back: TreeParams = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(&back, tree.params());
}
