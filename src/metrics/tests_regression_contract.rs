use super::*;

#[test]
fn r2_perfect_predictions() {
    let y = [1.0, 2.0, 3.0, 4.0, 5.0];
    let r2 = r_squared(&y, &y);
    assert!((r2 - 1.0).abs() < 1e-6, "R²={r2} for perfect predictions");
}

#[test]
fn r2_upper_bound() {
    let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y_pred = [1.1, 2.2, 2.8, 4.1, 4.9];
    assert!(r_squared(&y_pred, &y_true) <= 1.0 + 1e-6);
}

#[test]
fn r2_negative_for_bad_predictions() {
    let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y_pred = [10.0, 20.0, 30.0, 40.0, 50.0];
    assert!(r_squared(&y_pred, &y_true) < 0.0);
}

#[test]
fn r2_constant_targets_is_zero() {
    let y_true = [2.0, 2.0, 2.0];
    let y_pred = [1.0, 2.0, 3.0];
    assert_eq!(r_squared(&y_pred, &y_true), 0.0);
}

#[test]
fn mse_mae_rmse_known_values() {
    let y_true = [3.0, -0.5, 2.0, 7.0];
    let y_pred = [2.5, 0.0, 2.0, 8.0];
    assert!((mse(&y_pred, &y_true) - 0.375).abs() < 1e-6);
    assert!((mae(&y_pred, &y_true) - 0.5).abs() < 1e-6);
    assert!((rmse(&y_pred, &y_true) - 0.375_f32.sqrt()).abs() < 1e-6);
}

#[test]
fn accuracy_fraction() {
    assert!((accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]) - 0.75).abs() < 1e-6);
    assert_eq!(accuracy(&[], &[]), 0.0);
}

#[test]
fn regression_metric_higher_is_better() {
    let y_true = [1.0, 2.0, 3.0, 4.0];
    let good = [1.0, 2.1, 2.9, 4.0];
    let bad = [4.0, 3.0, 2.0, 1.0];
    for metric in [
        RegressionMetric::RSquared,
        RegressionMetric::NegMeanSquaredError,
        RegressionMetric::NegMeanAbsoluteError,
        RegressionMetric::NegRootMeanSquaredError,
    ] {
        assert!(
            metric.score(&good, &y_true) > metric.score(&bad, &y_true),
            "{metric:?} must rank the closer fit higher"
        );
    }
}

#[test]
fn regression_metric_default_is_r2() {
    assert_eq!(RegressionMetric::default(), RegressionMetric::RSquared);
}
