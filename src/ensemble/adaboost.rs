//! Multi-class AdaBoost (SAMME) over any classification learner.

use crate::data::Labeled;
use crate::error::{CartboostError, Result};
use crate::primitives::Matrix;
use crate::traits::{Learner, Probabilistic, RanksFeatures, Traced};
use crate::tree::{seeded_rng, DecisionTreeClassifier, FeatureImportances};
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Floor on the weighted error used when computing influences.
pub const DEFAULT_EPSILON: f32 = 1e-8;

/// AdaBoost classifier.
///
/// Each round trains a fresh clone of the base learner on a weighted
/// bootstrap of the training set, scores it on the full set, and up-weights
/// the samples it got wrong. Prediction is an influence-weighted vote.
///
/// # Algorithm
///
/// 1. Start with uniform sample weights `1/n`
/// 2. For each round:
///    - Draw `ratio * n` rows with replacement, proportional to weight
///    - Train a clone of the base learner on them
///    - `loss` = weighted error on the full training set
///    - `influence = rate * (ln((1 - loss) / loss) + ln(k - 1))`
///    - Multiply misclassified weights by `exp(influence)`, renormalize
/// 3. Stop early when `loss` drops below epsilon or becomes NaN
///
/// # Examples
///
/// ```
/// use cartboost::prelude::*;
///
/// let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 7.0, 8.0, 9.0]).unwrap();
/// let data = Labeled::new(x.clone(), vec![0_usize, 0, 0, 1, 1, 1]).unwrap();
///
/// let mut model = AdaBoostClassifier::new()
///     .with_n_estimators(10)
///     .with_ratio(1.0)
///     .with_random_state(7);
/// model.train(&data).unwrap();
/// assert_eq!(model.predict(&x).unwrap(), vec![0, 0, 0, 1, 1, 1]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostClassifier<L = DecisionTreeClassifier> {
    base: L,
    n_estimators: usize,
    learning_rate: f32,
    ratio: f32,
    epsilon: f32,
    random_state: Option<u64>,
    learners: Vec<L>,
    influences: Vec<f32>,
    classes: Vec<usize>,
    sample_weights: Vec<f32>,
    steps: Vec<f32>,
}

impl AdaBoostClassifier<DecisionTreeClassifier> {
    /// Creates an AdaBoost ensemble of depth-1 classification trees (stumps).
    ///
    /// # Default Parameters
    ///
    /// - `n_estimators`: 100
    /// - `learning_rate`: 1.0
    /// - `ratio`: 0.8
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_learner(DecisionTreeClassifier::new().with_max_depth(1))
    }
}

impl Default for AdaBoostClassifier<DecisionTreeClassifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> AdaBoostClassifier<L>
where
    L: Learner<Label = usize, Prediction = usize> + Clone,
{
    /// Creates an ensemble around a configured, untrained base learner.
    #[must_use]
    pub fn with_base_learner(base: L) -> Self {
        Self {
            base,
            n_estimators: 100,
            learning_rate: 1.0,
            ratio: 0.8,
            epsilon: DEFAULT_EPSILON,
            random_state: None,
            learners: Vec::new(),
            influences: Vec::new(),
            classes: Vec::new(),
            sample_weights: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Sets the maximum number of boosting rounds.
    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the learning rate that scales every influence.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the bootstrap size as a fraction of the training set.
    #[must_use]
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    /// Sets the error floor and early-exit threshold.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Seeds bootstrap sampling and the base learners.
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
        if !self.ratio.is_finite() || self.ratio <= 0.0 {
            return Err(CartboostError::invalid_hyperparameter(
                "ratio",
                self.ratio,
                "finite and > 0",
            ));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 0.5) {
            return Err(CartboostError::invalid_hyperparameter(
                "epsilon",
                self.epsilon,
                "in (0, 0.5)",
            ));
        }
        Ok(())
    }

    /// Influence of a round with weighted error `loss` over `n_classes` classes.
    ///
    /// Positive when the learner beats random guessing, negative when it is
    /// worse. `loss` is clamped to `[epsilon, 1 - epsilon]`.
    #[must_use]
    pub fn influence(&self, loss: f32, n_classes: usize) -> f32 {
        let loss = loss.clamp(self.epsilon, 1.0 - self.epsilon);
        let extra = (n_classes.saturating_sub(1).max(1) as f32).ln();
        self.learning_rate * (((1.0 - loss) / loss).ln() + extra)
    }

    /// Number of learners kept in the ensemble.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.learners.len()
    }

    /// Per-learner influences, in training order.
    #[must_use]
    pub fn influences(&self) -> &[f32] {
        &self.influences
    }

    /// Sample weights after the last completed round. Sums to 1.
    #[must_use]
    pub fn sample_weights(&self) -> &[f32] {
        &self.sample_weights
    }

    /// Class labels seen during training, ascending.
    #[must_use]
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Trained ensemble members, in training order.
    #[must_use]
    pub fn learners(&self) -> &[L] {
        &self.learners
    }

    /// Summed influence per class, in `classes()` order.
    fn class_scores(&self, samples: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        if self.learners.is_empty() {
            return Err(CartboostError::not_fitted("AdaBoostClassifier"));
        }
        let mut scores = vec![vec![0.0_f32; self.classes.len()]; samples.n_rows()];
        for (learner, &influence) in self.learners.iter().zip(&self.influences) {
            let votes = learner.predict(samples)?;
            for (row, vote) in scores.iter_mut().zip(votes) {
                if let Ok(idx) = self.classes.binary_search(&vote) {
                    row[idx] += influence;
                }
            }
        }
        Ok(scores)
    }
}

impl<L> Learner for AdaBoostClassifier<L>
where
    L: Learner<Label = usize, Prediction = usize> + Clone,
{
    type Label = usize;
    type Prediction = usize;

    fn train(&mut self, dataset: &Labeled<usize>) -> Result<()> {
        self.validate()?;
        if dataset.is_empty() {
            return Err(CartboostError::empty_input("training dataset"));
        }

        let n = dataset.n_rows();
        let classes = dataset.possible_outcomes();
        let n_classes = classes.len();
        let sample_size = ((self.ratio * n as f32).round() as usize).max(1);
        let mut rng = seeded_rng(self.random_state);
        let mut weights = vec![1.0 / n as f32; n];

        self.learners.clear();
        self.influences.clear();
        self.steps.clear();
        self.classes = classes;

        for round in 0..self.n_estimators {
            let bootstrap =
                dataset.random_weighted_subset_with_replacement(sample_size, &weights, &mut rng)?;
            let mut learner = self.base.clone();
            learner.set_random_state(rng.gen());
            learner.train(&bootstrap)?;

            let predictions = learner.predict(dataset.samples())?;
            let total: f32 = weights.iter().sum();
            let misclassified: Vec<bool> = predictions
                .iter()
                .zip(dataset.labels())
                .map(|(p, y)| p != y)
                .collect();
            let wrong: f32 = weights
                .iter()
                .zip(&misclassified)
                .filter_map(|(&w, &miss)| miss.then_some(w))
                .sum();
            let loss = wrong / total;

            if loss.is_nan() {
                warn!("AdaBoost round {round}: weighted error is NaN, stopping");
                break;
            }

            let influence = self.influence(loss, n_classes);
            debug!("AdaBoost round {round}: loss {loss:.6}, influence {influence:.6}");
            self.learners.push(learner);
            self.influences.push(influence);
            self.steps.push(loss);

            if loss < self.epsilon {
                info!("AdaBoost round {round}: training set fit perfectly, stopping");
                break;
            }

            let boost = influence.exp();
            let boosted: Vec<f32> = weights
                .iter()
                .zip(&misclassified)
                .map(|(&w, &miss)| if miss { w * boost } else { w })
                .collect();
            let sum: f32 = boosted.iter().sum();
            if !sum.is_finite() || sum <= 0.0 {
                // Keep the last normalized weights.
                warn!("AdaBoost round {round}: sample weights degenerated, stopping");
                break;
            }
            weights = boosted.into_iter().map(|w| w / sum).collect();
        }

        self.sample_weights = weights;
        info!(
            "AdaBoost trained {} of {} learners",
            self.learners.len(),
            self.n_estimators
        );
        Ok(())
    }

    fn predict(&self, samples: &Matrix<f32>) -> Result<Vec<usize>> {
        let scores = self.class_scores(samples)?;
        Ok(scores
            .iter()
            .map(|row| {
                let mut best = 0;
                for (idx, &score) in row.iter().enumerate() {
                    if score > row[best] {
                        best = idx;
                    }
                }
                self.classes[best]
            })
            .collect())
    }

    fn is_trained(&self) -> bool {
        !self.learners.is_empty()
    }

    fn set_random_state(&mut self, seed: u64) {
        self.random_state = Some(seed);
    }
}

impl<L> Probabilistic for AdaBoostClassifier<L>
where
    L: Learner<Label = usize, Prediction = usize> + Clone,
{
    /// Positive class scores normalized to a distribution; uniform when no
    /// class received positive influence.
    fn proba(&self, samples: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        let scores = self.class_scores(samples)?;
        let k = self.classes.len();
        Ok(scores
            .into_iter()
            .map(|row| {
                let positive: Vec<f32> = row.iter().map(|s| s.max(0.0)).collect();
                let total: f32 = positive.iter().sum();
                if total > 0.0 {
                    positive.iter().map(|s| s / total).collect()
                } else {
                    vec![1.0 / k as f32; k]
                }
            })
            .collect())
    }
}

impl<L> RanksFeatures for AdaBoostClassifier<L>
where
    L: Learner<Label = usize, Prediction = usize> + RanksFeatures + Clone,
{
    fn importance_totals(&self) -> Result<FeatureImportances> {
        if self.learners.is_empty() {
            return Err(CartboostError::not_fitted("AdaBoostClassifier"));
        }
        let mut totals = FeatureImportances::default();
        for learner in &self.learners {
            totals.merge(&learner.importance_totals()?);
        }
        Ok(totals)
    }
}

impl<L> Traced for AdaBoostClassifier<L> {
    fn steps(&self) -> &[f32] {
        &self.steps
    }
}
