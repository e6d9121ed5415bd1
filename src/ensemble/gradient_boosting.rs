//! Stochastic gradient boosting for regression under squared loss.

use super::EarlyStopping;
use crate::data::Labeled;
use crate::dummy::DummyRegressor;
use crate::error::{CartboostError, Result};
use crate::metrics::{mse, RegressionMetric};
use crate::primitives::{Matrix, Vector};
use crate::traits::{Learner, Metric, RanksFeatures, Traced};
use crate::tree::{seeded_rng, DecisionTreeRegressor, FeatureImportances};
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Gradient Boosting Regressor.
///
/// Fits a base model once, then repeatedly fits booster trees to the
/// residuals of the running prediction. A held-out partition is scored after
/// every round and drives early stopping.
///
/// # Algorithm
///
/// 1. Shuffle and hold out `holdout * n` rows for validation
/// 2. Fit the base learner on the training rows (mean by default)
/// 3. For each round:
///    - residual = target - running prediction
///    - fit a booster on `ratio * n_train` rows drawn without replacement
///    - running prediction += `learning_rate` * booster output
///    - record training MSE and the validation score
/// 4. Stop once the validation score fails to improve by more than
///    `min_change` for `window` consecutive rounds
///
/// # Examples
///
/// ```
/// use cartboost::prelude::*;
///
/// let x = Matrix::from_vec(40, 1, (0..40).map(|v| v as f32).collect()).unwrap();
/// let y: Vec<f32> = (0..40).map(|v| 2.0 * v as f32 + 1.0).collect();
/// let data = Labeled::new(x.clone(), y).unwrap();
///
/// let mut model = GradientBoostingRegressor::new()
///     .with_n_estimators(50)
///     .with_learning_rate(0.3)
///     .with_random_state(1);
/// model.train(&data).unwrap();
/// assert!(model.steps().len() <= 50);
/// assert_eq!(model.predict(&x).unwrap().len(), 40);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor<
    B = DummyRegressor,
    T = DecisionTreeRegressor,
    M = RegressionMetric,
> {
    base: B,
    booster: T,
    n_estimators: usize,
    learning_rate: f32,
    ratio: f32,
    min_change: f32,
    window: usize,
    holdout: f32,
    metric: M,
    restore_best: bool,
    random_state: Option<u64>,
    fitted_base: Option<B>,
    boosters: Vec<T>,
    steps: Vec<f32>,
    scores: Vec<f32>,
    best_round: Option<usize>,
}

impl GradientBoostingRegressor<DummyRegressor, DecisionTreeRegressor> {
    /// Creates a booster of depth-3 regression trees over a mean predictor.
    ///
    /// # Default Parameters
    ///
    /// - `n_estimators`: 1000
    /// - `learning_rate`: 0.1
    /// - `ratio`: 0.5
    /// - `min_change`: 1e-4, `window`: 10
    /// - `holdout`: 0.1, metric: R²
    #[must_use]
    pub fn new() -> Self {
        Self::with_learners(
            DummyRegressor::new(),
            DecisionTreeRegressor::new().with_max_depth(3),
        )
    }
}

impl Default for GradientBoostingRegressor<DummyRegressor, DecisionTreeRegressor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, T> GradientBoostingRegressor<B, T, RegressionMetric>
where
    B: Learner<Label = f32, Prediction = f32> + Clone,
    T: Learner<Label = f32, Prediction = f32> + Clone,
{
    /// Creates an ensemble from a configured base learner and booster template.
    #[must_use]
    pub fn with_learners(base: B, booster: T) -> Self {
        Self {
            base,
            booster,
            n_estimators: 1000,
            learning_rate: 0.1,
            ratio: 0.5,
            min_change: 1e-4,
            window: 10,
            holdout: 0.1,
            metric: RegressionMetric::RSquared,
            restore_best: false,
            random_state: None,
            fitted_base: None,
            boosters: Vec::new(),
            steps: Vec::new(),
            scores: Vec::new(),
            best_round: None,
        }
    }
}

impl<B, T, M> GradientBoostingRegressor<B, T, M>
where
    B: Learner<Label = f32, Prediction = f32> + Clone,
    T: Learner<Label = f32, Prediction = f32> + Clone,
    M: Metric,
{
    /// Sets the maximum number of boosting rounds.
    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the shrinkage applied to every booster's output.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the fraction of training rows each booster sees.
    #[must_use]
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    /// Sets the minimum score gain that counts as an improvement.
    #[must_use]
    pub fn with_min_change(mut self, min_change: f32) -> Self {
        self.min_change = min_change;
        self
    }

    /// Sets how many stale rounds are tolerated before stopping.
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Sets the fraction of rows held out for validation.
    #[must_use]
    pub fn with_holdout(mut self, holdout: f32) -> Self {
        self.holdout = holdout;
        self
    }

    /// Sets the validation metric. Any [`Metric`] works; higher must be better.
    #[must_use]
    pub fn with_metric<N: Metric>(self, metric: N) -> GradientBoostingRegressor<B, T, N> {
        GradientBoostingRegressor {
            base: self.base,
            booster: self.booster,
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            ratio: self.ratio,
            min_change: self.min_change,
            window: self.window,
            holdout: self.holdout,
            metric,
            restore_best: self.restore_best,
            random_state: self.random_state,
            fitted_base: None,
            boosters: Vec::new(),
            steps: Vec::new(),
            scores: Vec::new(),
            best_round: None,
        }
    }

    /// Keeps only the boosters up to the best validation round.
    #[must_use]
    pub fn with_restore_best(mut self, restore_best: bool) -> Self {
        self.restore_best = restore_best;
        self
    }

    /// Seeds the holdout split, row subsampling and the boosters.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Checks every hyperparameter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(CartboostError::invalid_hyperparameter("n_estimators", 0, ">= 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(CartboostError::invalid_hyperparameter(
                "learning_rate",
                self.learning_rate,
                "finite and > 0",
            ));
        }
        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return Err(CartboostError::invalid_hyperparameter("ratio", self.ratio, "in (0, 1]"));
        }
        if !self.min_change.is_finite() || self.min_change < 0.0 {
            return Err(CartboostError::invalid_hyperparameter(
                "min_change",
                self.min_change,
                "finite and >= 0",
            ));
        }
        if self.window == 0 {
            return Err(CartboostError::invalid_hyperparameter("window", 0, ">= 1"));
        }
        if !(self.holdout > 0.0 && self.holdout < 1.0) {
            return Err(CartboostError::invalid_hyperparameter(
                "holdout",
                self.holdout,
                "in (0, 1)",
            ));
        }
        Ok(())
    }

    /// Number of boosters kept in the ensemble.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.boosters.len()
    }

    /// Trained boosters, in training order.
    #[must_use]
    pub fn boosters(&self) -> &[T] {
        &self.boosters
    }

    /// Zero-based round with the best validation score.
    #[must_use]
    pub fn best_round(&self) -> Option<usize> {
        self.best_round
    }

    /// Fits on a feature matrix and continuous targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the data or hyperparameters are invalid.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let dataset = Labeled::new(x.clone(), y.as_slice().to_vec())?;
        self.train(&dataset)
    }

    /// Computes the R² score on test data.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or shapes disagree.
    pub fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f32> {
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(CartboostError::dimension_mismatch("targets", predictions.len(), y.len()));
        }
        Ok(crate::metrics::r_squared(&predictions, y.as_slice()))
    }

    /// Splits off the validation rows and returns `(training, validation)`.
    fn holdout_split<R: Rng>(&self, dataset: &Labeled<f32>, rng: &mut R) -> Result<(Labeled<f32>, Labeled<f32>)> {
        let n = dataset.n_rows();
        let n_val = (self.holdout * n as f32).floor() as usize;
        if n_val < 1 {
            return Err(CartboostError::InvalidInput {
                message: format!(
                    "holdout {} of {n} rows leaves no validation samples",
                    self.holdout
                ),
            });
        }
        if n_val >= n {
            return Err(CartboostError::InvalidInput {
                message: format!("holdout {} of {n} rows leaves no training samples", self.holdout),
            });
        }
        let (validation, training) = dataset.shuffled_split(n_val, rng)?;
        Ok((training, validation))
    }
}

impl<B, T, M> Learner for GradientBoostingRegressor<B, T, M>
where
    B: Learner<Label = f32, Prediction = f32> + Clone,
    T: Learner<Label = f32, Prediction = f32> + Clone,
    M: Metric,
{
    type Label = f32;
    type Prediction = f32;

    fn train(&mut self, dataset: &Labeled<f32>) -> Result<()> {
        self.validate()?;
        if dataset.is_empty() {
            return Err(CartboostError::empty_input("training dataset"));
        }
        if dataset.labels().iter().any(|y| !y.is_finite()) {
            return Err("regression targets must be finite".into());
        }

        let mut rng = seeded_rng(self.random_state);
        let (training, validation) = self.holdout_split(dataset, &mut rng)?;
        let subsample_size = (self.ratio * training.n_rows() as f32).round() as usize;
        if subsample_size == 0 {
            return Err(CartboostError::InvalidInput {
                message: format!(
                    "ratio {} of {} training rows selects no samples",
                    self.ratio,
                    training.n_rows()
                ),
            });
        }

        let mut base = self.base.clone();
        base.set_random_state(rng.gen());
        base.train(&training)?;
        let mut train_pred = base.predict(training.samples())?;
        let mut val_pred = base.predict(validation.samples())?;

        self.fitted_base = None;
        self.boosters.clear();
        self.steps.clear();
        self.scores.clear();
        self.best_round = None;
        let mut stopper = EarlyStopping::new(self.min_change, self.window);

        for round in 0..self.n_estimators {
            let residuals: Vec<f32> = training
                .labels()
                .iter()
                .zip(&train_pred)
                .map(|(y, p)| y - p)
                .collect();
            let residual_set = Labeled::new(training.samples().clone(), residuals)?
                .with_column_types(training.column_types().to_vec())?;
            let subsample = residual_set.random_subset(subsample_size, &mut rng);

            let mut booster = self.booster.clone();
            booster.set_random_state(rng.gen());
            booster.train(&subsample)?;

            let step_train = booster.predict(training.samples())?;
            let step_val = booster.predict(validation.samples())?;
            for (p, s) in train_pred.iter_mut().zip(&step_train) {
                *p += self.learning_rate * s;
            }
            for (p, s) in val_pred.iter_mut().zip(&step_val) {
                *p += self.learning_rate * s;
            }

            let loss = mse(&train_pred, training.labels());
            if loss.is_nan() {
                warn!("gradient boosting round {round}: loss is NaN, stopping");
                break;
            }
            let score = self.metric.score(&val_pred, validation.labels());

            self.boosters.push(booster);
            self.steps.push(loss);
            self.scores.push(score);
            debug!("gradient boosting round {round}: loss {loss:.6}, validation {score:.6}");

            if stopper.update(score) {
                info!(
                    "gradient boosting stopped early at round {round}: no gain above {} for {} rounds",
                    self.min_change, self.window
                );
                break;
            }
        }

        self.best_round = stopper.best_round();
        if self.restore_best {
            if let Some(best) = self.best_round {
                self.boosters.truncate(best + 1);
            }
        }
        self.fitted_base = Some(base);
        info!(
            "gradient boosting kept {} boosters, best validation score {}",
            self.boosters.len(),
            stopper.best()
        );
        Ok(())
    }

    fn predict(&self, samples: &Matrix<f32>) -> Result<Vec<f32>> {
        let base = self
            .fitted_base
            .as_ref()
            .ok_or_else(|| CartboostError::not_fitted("GradientBoostingRegressor"))?;
        let mut predictions = base.predict(samples)?;
        for booster in &self.boosters {
            let step = booster.predict(samples)?;
            for (p, s) in predictions.iter_mut().zip(step) {
                *p += self.learning_rate * s;
            }
        }
        Ok(predictions)
    }

    fn is_trained(&self) -> bool {
        self.fitted_base.is_some()
    }

    fn set_random_state(&mut self, seed: u64) {
        self.random_state = Some(seed);
    }
}

impl<B, T, M> RanksFeatures for GradientBoostingRegressor<B, T, M>
where
    B: Learner<Label = f32, Prediction = f32> + Clone,
    T: Learner<Label = f32, Prediction = f32> + RanksFeatures + Clone,
    M: Metric,
{
    fn importance_totals(&self) -> Result<FeatureImportances> {
        if self.fitted_base.is_none() {
            return Err(CartboostError::not_fitted("GradientBoostingRegressor"));
        }
        let mut totals = FeatureImportances::default();
        for booster in &self.boosters {
            totals.merge(&booster.importance_totals()?);
        }
        Ok(totals)
    }
}

impl<B, T, M> Traced for GradientBoostingRegressor<B, T, M> {
    fn steps(&self) -> &[f32] {
        &self.steps
    }

    fn scores(&self) -> &[f32] {
        &self.scores
    }
}
