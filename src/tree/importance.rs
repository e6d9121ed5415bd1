//! Feature importance accumulation.
//!
//! The builder records the impurity decrease of every split against the
//! feature it split on. Ensembles merge the raw totals of their members and
//! normalize once at read time.

use serde::{Deserialize, Serialize};

/// Running sum of weighted impurity decrease per feature.
///
/// # Examples
///
/// ```
/// use cartboost::tree::FeatureImportances;
///
/// let mut imp = FeatureImportances::new(3);
/// imp.record(0, 0.3, 1.0);
/// imp.record(2, 0.1, 1.0);
/// let normalized = imp.normalized();
/// assert!((normalized[0] - 0.75).abs() < 1e-6);
/// assert_eq!(normalized[1], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeatureImportances {
    totals: Vec<f32>,
}

impl FeatureImportances {
    /// Creates an all-zero accumulator for `n_features` columns.
    #[must_use]
    pub fn new(n_features: usize) -> Self {
        Self {
            totals: vec![0.0; n_features],
        }
    }

    /// Adds `impurity_decrease * weight` to `feature_idx`.
    ///
    /// Negative or non-finite contributions are ignored, so totals stay
    /// non-negative.
    pub fn record(&mut self, feature_idx: usize, impurity_decrease: f32, weight: f32) {
        let contribution = impurity_decrease * weight;
        if !contribution.is_finite() || contribution <= 0.0 {
            return;
        }
        if feature_idx >= self.totals.len() {
            self.totals.resize(feature_idx + 1, 0.0);
        }
        self.totals[feature_idx] += contribution;
    }

    /// Adds another accumulator's totals into this one.
    pub fn merge(&mut self, other: &Self) {
        if other.totals.len() > self.totals.len() {
            self.totals.resize(other.totals.len(), 0.0);
        }
        for (total, &value) in self.totals.iter_mut().zip(&other.totals) {
            *total += value;
        }
    }

    /// Number of features tracked.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.totals.len()
    }

    /// Raw totals, indexed by feature.
    #[must_use]
    pub fn totals(&self) -> &[f32] {
        &self.totals
    }

    /// Grand total across features.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.totals.iter().sum()
    }

    /// Totals divided by the grand total. All zeros when nothing was recorded.
    #[must_use]
    pub fn normalized(&self) -> Vec<f32> {
        let sum = self.total();
        if sum <= 0.0 {
            return vec![0.0; self.totals.len()];
        }
        self.totals.iter().map(|v| v / sum).collect()
    }
}
