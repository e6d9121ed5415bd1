//! Integration tests for cartboost.
//!
//! These tests verify end-to-end workflows combining datasets, trees and
//! boosting ensembles.

use cartboost::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn interval_dataset() -> Labeled<usize> {
    // Class 1 on [5, 15): no single threshold separates it.
    let x = Matrix::from_vec(20, 1, (0..20).map(|v| v as f32).collect()).unwrap();
    let y = (0..20).map(|v| usize::from((5..15).contains(&v))).collect();
    Labeled::new(x, y).unwrap()
}

fn blobs() -> Labeled<usize> {
    let mut values = Vec::new();
    let mut labels = Vec::new();
    for i in 0..40 {
        let jitter = (i % 7) as f32 * 0.1;
        let (cx, cy, class) = if i % 2 == 0 { (0.0, 0.0, 0) } else { (3.0, 3.0, 1) };
        values.push(cx + jitter);
        values.push(cy - jitter);
        labels.push(class);
    }
    Labeled::new(Matrix::from_vec(40, 2, values).unwrap(), labels).unwrap()
}

#[test]
fn test_decision_tree_workflow() {
    let data = blobs();
    let mut rng = StdRng::seed_from_u64(10);
    let (train, test) = data.shuffled_split(30, &mut rng).expect("split");

    let mut tree = DecisionTreeClassifier::new().with_max_depth(3);
    tree.train(&train).expect("Failed to fit tree");

    let accuracy = tree
        .score(test.samples(), test.labels())
        .expect("tree is fitted");
    assert!(accuracy > 0.9, "accuracy should be high on separated blobs: {accuracy}");
    assert_eq!(tree.classes(), &[0, 1]);
}

#[test]
fn test_adaboost_beats_single_stump() {
    let data = interval_dataset();

    let mut stump = DecisionTreeClassifier::new().with_max_depth(1);
    stump.train(&data).expect("Failed to fit stump");
    let stump_accuracy = stump.score(data.samples(), data.labels()).expect("fitted");
    assert!(stump_accuracy <= 0.75 + 1e-6);

    let mut model = AdaBoostClassifier::new()
        .with_n_estimators(50)
        .with_ratio(1.0)
        .with_random_state(2024);
    model.train(&data).expect("Failed to fit AdaBoost");

    let predictions = model.predict(data.samples()).expect("fitted");
    let boosted_accuracy = accuracy(&predictions, data.labels());
    assert!(
        boosted_accuracy >= 0.9,
        "boosting should carve out the interval: {boosted_accuracy}"
    );
    assert!(boosted_accuracy > stump_accuracy);
}

#[test]
fn test_gradient_boosting_beats_mean_baseline() {
    let n = 80;
    let x = Matrix::from_vec(n, 1, (0..n).map(|v| v as f32 * 0.1).collect()).unwrap();
    let y: Vec<f32> = (0..n).map(|v| (v as f32 * 0.1).sin() * 3.0).collect();
    let data = Labeled::new(x.clone(), y.clone()).unwrap();
    let targets = Vector::from_vec(y);

    let mut baseline = DummyRegressor::new();
    baseline.train(&data).expect("Failed to fit baseline");
    let baseline_r2 = r_squared(&baseline.predict(&x).expect("fitted"), targets.as_slice());

    let mut model = GradientBoostingRegressor::new()
        .with_n_estimators(200)
        .with_learning_rate(0.2)
        .with_random_state(7);
    model.train(&data).expect("Failed to fit gradient boosting");

    let r2 = model.score(&x, &targets).expect("fitted");
    assert!(r2 > 0.9, "R² should be high for a smooth target: {r2}");
    assert!(r2 > baseline_r2);
    assert_eq!(model.steps().len(), model.scores().len());
    assert!(model.steps().len() <= 200);
}

#[test]
fn test_seeded_training_is_reproducible_across_serde() {
    let n = 50;
    let x = Matrix::from_vec(n, 2, (0..n * 2).map(|v| (v % 13) as f32).collect()).unwrap();
    let y: Vec<f32> = (0..n).map(|v| (v % 5) as f32).collect();
    let data = Labeled::new(x.clone(), y).unwrap();

    let config = GradientBoostingRegressor::new()
        .with_n_estimators(25)
        .with_metric(RegressionMetric::NegMeanAbsoluteError)
        .with_random_state(31);
    let json = serde_json::to_string(&config).expect("serialize");
    let mut restored: GradientBoostingRegressor = serde_json::from_str(&json).expect("deserialize");

    let mut original = config;
    original.train(&data).expect("train original");
    restored.train(&data).expect("train restored");

    assert_eq!(original.steps(), restored.steps());
    assert_eq!(
        original.predict(&x).expect("fitted"),
        restored.predict(&x).expect("fitted")
    );
}

#[test]
fn test_categorical_features_through_boosting() {
    // Column 0 is a category code that fully determines the class.
    let n = 30;
    let mut values = Vec::with_capacity(n * 2);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let category = (i % 3) as f32;
        values.push(category);
        values.push(i as f32);
        labels.push(usize::from(i % 3 == 1));
    }
    let x = Matrix::from_vec(n, 2, values).unwrap();
    let data = Labeled::new(x.clone(), labels.clone())
        .unwrap()
        .with_column_types(vec![ColumnType::Categorical, ColumnType::Continuous])
        .unwrap();

    let mut model = AdaBoostClassifier::new()
        .with_n_estimators(10)
        .with_ratio(1.0)
        .with_random_state(3);
    model.train(&data).expect("Failed to fit AdaBoost");
    assert_eq!(model.predict(&x).expect("fitted"), labels);

    let importances = model.feature_importances().expect("fitted");
    assert!(importances[0] > 0.5);
}

#[test]
fn test_untrained_models_report_not_fitted() {
    let x = Matrix::from_vec(2, 1, vec![0.0, 1.0]).unwrap();
    let errors = [
        DecisionTreeClassifier::new().predict(&x).unwrap_err(),
        AdaBoostClassifier::new().predict(&x).unwrap_err(),
    ];
    for err in errors {
        assert!(err.is_not_fitted());
        assert!(err.to_string().contains("not fitted"));
    }
    assert!(GradientBoostingRegressor::new()
        .predict(&x)
        .unwrap_err()
        .is_not_fitted());
    assert!(DecisionTreeRegressor::new()
        .predict(&x)
        .unwrap_err()
        .is_not_fitted());
}
