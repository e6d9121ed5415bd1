//! Impurity criteria used to score candidate splits.
//!
//! Every criterion maps a weighted group of labels to a non-negative scalar,
//! where 0 means pure and lower is better. The builder only compares these
//! values, so any criterion with that ordering can be plugged in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A pluggable impurity measure together with the leaf value it implies.
pub trait SplitCriterion: Copy + Send + Sync + fmt::Debug {
    /// Label type scored by this criterion.
    type Label: Copy + PartialEq + Send + Sync;
    /// Value stored in leaves grown under this criterion.
    type Outcome: Clone + fmt::Debug + Send;

    /// Impurity of a weighted group. `weights` is parallel to `labels`.
    fn impurity(&self, labels: &[Self::Label], weights: &[f32]) -> f32;

    /// Leaf value for a weighted group.
    fn leaf(&self, labels: &[Self::Label], weights: &[f32]) -> Self::Outcome;
}

/// Classification impurity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClassificationCriterion {
    /// Gini index, `1 - Σ p_c²`.
    #[default]
    Gini,
    /// Shannon entropy in bits, `-Σ p_c log2 p_c`.
    Entropy,
}

/// Regression impurity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RegressionCriterion {
    /// Weighted variance of the targets.
    #[default]
    Variance,
    /// Weighted mean absolute deviation from the weighted mean.
    MeanAbsoluteDeviation,
}

/// Weighted class distribution stored in classification leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    /// Class with the largest weight (smallest label wins ties)
    pub class_label: usize,
    /// `(class, probability)` pairs in ascending class order
    pub probabilities: Vec<(usize, f32)>,
}

impl ClassDistribution {
    /// Probability assigned to `class`, 0.0 when the class never reached the leaf.
    #[must_use]
    pub fn probability(&self, class: usize) -> f32 {
        self.probabilities
            .iter()
            .find(|(c, _)| *c == class)
            .map_or(0.0, |(_, p)| *p)
    }
}

/// Per-class weight totals in ascending class order.
fn class_weights(labels: &[usize], weights: &[f32]) -> BTreeMap<usize, f32> {
    let mut totals = BTreeMap::new();
    for (&label, &w) in labels.iter().zip(weights) {
        *totals.entry(label).or_insert(0.0) += w;
    }
    totals
}

/// Gini impurity of a weighted label group.
///
/// Formula: Gini = 1 - `Σ(p_i²)` where `p_i` is the weight share of class i
#[must_use]
pub fn gini_impurity(labels: &[usize], weights: &[f32]) -> f32 {
    let totals = class_weights(labels, weights);
    let n: f32 = totals.values().sum();
    if n <= 0.0 {
        return 0.0;
    }

    let mut gini = 1.0;
    for w in totals.values() {
        let p = w / n;
        gini -= p * p;
    }
    gini.max(0.0)
}

/// Entropy (base 2) of a weighted label group.
#[must_use]
pub fn entropy(labels: &[usize], weights: &[f32]) -> f32 {
    let totals = class_weights(labels, weights);
    let n: f32 = totals.values().sum();
    if n <= 0.0 {
        return 0.0;
    }

    let h: f32 = totals
        .values()
        .filter(|&&w| w > 0.0)
        .map(|w| {
            let p = w / n;
            -p * p.log2()
        })
        .sum();
    h.max(0.0)
}

/// Weighted mean of `values`, 0.0 when the total weight is zero.
#[must_use]
pub fn weighted_mean(values: &[f32], weights: &[f32]) -> f32 {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f32>() / total
}

/// Weighted variance of `values`.
#[must_use]
pub fn weighted_variance(values: &[f32], weights: &[f32]) -> f32 {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mean = weighted_mean(values, weights);
    let ss: f32 = values
        .iter()
        .zip(weights)
        .map(|(v, w)| w * (v - mean).powi(2))
        .sum();
    (ss / total).max(0.0)
}

/// Weighted mean absolute deviation of `values` from their weighted mean.
#[must_use]
pub fn mean_absolute_deviation(values: &[f32], weights: &[f32]) -> f32 {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mean = weighted_mean(values, weights);
    values
        .iter()
        .zip(weights)
        .map(|(v, w)| w * (v - mean).abs())
        .sum::<f32>()
        / total
}

impl SplitCriterion for ClassificationCriterion {
    type Label = usize;
    type Outcome = ClassDistribution;

    fn impurity(&self, labels: &[usize], weights: &[f32]) -> f32 {
        match self {
            Self::Gini => gini_impurity(labels, weights),
            Self::Entropy => entropy(labels, weights),
        }
    }

    fn leaf(&self, labels: &[usize], weights: &[f32]) -> ClassDistribution {
        let totals = class_weights(labels, weights);
        let n: f32 = totals.values().sum();

        // BTreeMap iterates ascending, so strict `>` keeps the smallest label on ties.
        let mut class_label = labels.first().copied().unwrap_or(0);
        let mut best = f32::NEG_INFINITY;
        for (&class, &w) in &totals {
            if w > best {
                best = w;
                class_label = class;
            }
        }

        let probabilities = totals
            .into_iter()
            .map(|(class, w)| (class, if n > 0.0 { w / n } else { 0.0 }))
            .collect();

        ClassDistribution {
            class_label,
            probabilities,
        }
    }
}

impl SplitCriterion for RegressionCriterion {
    type Label = f32;
    type Outcome = f32;

    fn impurity(&self, labels: &[f32], weights: &[f32]) -> f32 {
        match self {
            Self::Variance => weighted_variance(labels, weights),
            Self::MeanAbsoluteDeviation => mean_absolute_deviation(labels, weights),
        }
    }

    fn leaf(&self, labels: &[f32], weights: &[f32]) -> f32 {
        weighted_mean(labels, weights)
    }
}
