//! Recursive CART induction.
//!
//! The builder grows a binary tree depth-first. At each node it either emits
//! a leaf (stopping rules) or searches candidate splits over a subset of the
//! feature columns and recurses into both sides of the best one.
//!
//! Candidate evaluation runs in parallel across features. The winner is
//! picked by a sequential scan in feature order, so the chosen split never
//! depends on thread scheduling: ties go to the first feature, and within a
//! feature to the first threshold in ascending order.

use super::criterion::SplitCriterion;
use super::importance::FeatureImportances;
use super::{Leaf, Split, TreeNode};
use crate::data::{goes_left, ColumnType, Labeled};
use crate::error::{CartboostError, Result};
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Impurity at or below this value counts as pure.
pub const IMPURITY_TOLERANCE: f32 = 1e-7;

/// Split search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Splitter {
    /// Enumerate every threshold of every candidate feature.
    #[default]
    Best,
    /// Draw one random threshold per candidate feature (extremely randomized trees).
    Random,
}

/// Number of features considered at each node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum MaxFeatures {
    /// Every feature.
    #[default]
    All,
    /// `sqrt(n_features)`.
    Sqrt,
    /// `log2(n_features)`.
    Log2,
    /// A fixed count.
    Count(usize),
    /// A fraction of the features, in (0, 1].
    Fraction(f32),
}

impl MaxFeatures {
    /// Resolves to a concrete count in `1..=n_features`.
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            Self::All => n_features,
            Self::Sqrt => (n_features as f32).sqrt() as usize,
            Self::Log2 => (n_features as f32).log2() as usize,
            Self::Count(k) => k,
            Self::Fraction(f) => (f * n_features as f32).round() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Hyperparameters shared by classification and regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (root has depth 0). `None` grows until another rule stops.
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum samples each side of a split must keep.
    pub min_samples_leaf: usize,
    /// Minimum weighted impurity decrease a split must achieve.
    pub min_impurity_decrease: f32,
    /// Features considered per node.
    pub max_features: MaxFeatures,
    /// Split search strategy.
    pub splitter: Splitter,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_impurity_decrease: 0.0,
            max_features: MaxFeatures::All,
            splitter: Splitter::Best,
        }
    }
}

impl TreeParams {
    /// Checks every hyperparameter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(CartboostError::invalid_hyperparameter(
                "min_samples_split",
                self.min_samples_split,
                ">= 2",
            ));
        }
        if self.min_samples_leaf < 1 {
            return Err(CartboostError::invalid_hyperparameter(
                "min_samples_leaf",
                self.min_samples_leaf,
                ">= 1",
            ));
        }
        if !self.min_impurity_decrease.is_finite() || self.min_impurity_decrease < 0.0 {
            return Err(CartboostError::invalid_hyperparameter(
                "min_impurity_decrease",
                self.min_impurity_decrease,
                "finite and >= 0",
            ));
        }
        match self.max_features {
            MaxFeatures::Count(0) => Err(CartboostError::invalid_hyperparameter(
                "max_features",
                0,
                ">= 1",
            )),
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(
                CartboostError::invalid_hyperparameter("max_features", f, "in (0, 1]"),
            ),
            _ => Ok(()),
        }
    }
}

/// Creates the generator a model trains with.
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Work item for one feature at one node.
#[derive(Debug, Clone, Copy)]
enum Probe {
    Exhaustive(usize),
    Threshold(usize, f32),
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature_idx: usize,
    threshold: f32,
    impurity: f32,
}

/// One tree induction run over a labeled dataset.
pub(crate) struct CartBuilder<'a, C: SplitCriterion> {
    criterion: C,
    params: &'a TreeParams,
    dataset: &'a Labeled<C::Label>,
    weights: Vec<f32>,
    total_weight: f32,
    importances: FeatureImportances,
    rng: StdRng,
}

impl<'a, C: SplitCriterion> CartBuilder<'a, C> {
    /// Validates inputs and prepares a build. Weights default to uniform.
    pub(crate) fn new(
        criterion: C,
        params: &'a TreeParams,
        dataset: &'a Labeled<C::Label>,
        weights: Option<&[f32]>,
        rng: StdRng,
    ) -> Result<Self> {
        params.validate()?;
        if dataset.is_empty() {
            return Err(CartboostError::empty_input("training dataset"));
        }
        if dataset.n_cols() == 0 {
            return Err(CartboostError::empty_input("feature columns"));
        }

        let n = dataset.n_rows();
        let weights = match weights {
            Some(w) => {
                if w.len() != n {
                    return Err(CartboostError::dimension_mismatch("weights", n, w.len()));
                }
                if w.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err("sample weights must be finite and non-negative".into());
                }
                w.to_vec()
            }
            None => vec![1.0; n],
        };
        let total_weight: f32 = weights.iter().sum();
        if total_weight <= 0.0 {
            return Err("sample weights must not all be zero".into());
        }

        Ok(Self {
            criterion,
            params,
            dataset,
            weights,
            total_weight,
            importances: FeatureImportances::new(dataset.n_cols()),
            rng,
        })
    }

    /// Grows the whole tree and returns it with the recorded importances.
    pub(crate) fn build(mut self) -> (TreeNode<C::Outcome>, FeatureImportances) {
        let indices: Vec<usize> = (0..self.dataset.n_rows()).collect();
        let root = self.grow(&indices, 0);
        (root, self.importances)
    }

    fn grow(&mut self, indices: &[usize], depth: usize) -> TreeNode<C::Outcome> {
        let labels: Vec<C::Label> = indices.iter().map(|&i| self.dataset.labels()[i]).collect();
        let weights: Vec<f32> = indices.iter().map(|&i| self.weights[i]).collect();
        let n_samples = indices.len();
        let impurity = self.criterion.impurity(&labels, &weights);

        let pure = labels.windows(2).all(|w| w[0] == w[1]);
        let at_max_depth = self.params.max_depth.is_some_and(|d| depth >= d);
        if n_samples < self.params.min_samples_split
            || at_max_depth
            || pure
            || impurity <= IMPURITY_TOLERANCE
        {
            return self.leaf(&labels, &weights, n_samples);
        }

        let Some(best) = self.find_split(indices) else {
            return self.leaf(&labels, &weights, n_samples);
        };

        let decrease = impurity - best.impurity;
        let weight_share = weights.iter().sum::<f32>() / self.total_weight;
        let exhaustive = self.params.splitter == Splitter::Best;
        if (exhaustive && decrease <= 0.0)
            || weight_share * decrease < self.params.min_impurity_decrease
        {
            return self.leaf(&labels, &weights, n_samples);
        }

        let column_type = self.dataset.column_type(best.feature_idx);
        let samples = self.dataset.samples();
        let (left, right): (Vec<usize>, Vec<usize>) = indices.iter().copied().partition(|&i| {
            goes_left(column_type, samples.get(i, best.feature_idx), best.threshold)
        });
        if left.is_empty() || right.is_empty() {
            return self.leaf(&labels, &weights, n_samples);
        }

        trace!(
            "depth {depth}: split feature {} at {} ({} | {}), impurity {impurity} -> {}",
            best.feature_idx,
            best.threshold,
            left.len(),
            right.len(),
            best.impurity
        );
        self.importances
            .record(best.feature_idx, decrease, weight_share);

        let left_child = self.grow(&left, depth + 1);
        let right_child = self.grow(&right, depth + 1);

        TreeNode::Split(Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            column_type,
            impurity,
            split_impurity: best.impurity,
            n_samples,
            left: Box::new(left_child),
            right: Box::new(right_child),
        })
    }

    fn leaf(&self, labels: &[C::Label], weights: &[f32], n_samples: usize) -> TreeNode<C::Outcome> {
        TreeNode::Leaf(Leaf {
            outcome: self.criterion.leaf(labels, weights),
            n_samples,
        })
    }

    fn find_split(&mut self, indices: &[usize]) -> Option<Candidate> {
        let n_features = self.dataset.n_cols();
        let k = self.params.max_features.resolve(n_features);
        let mut features: Vec<usize> = if k < n_features {
            rand::seq::index::sample(&mut self.rng, n_features, k).into_vec()
        } else {
            (0..n_features).collect()
        };
        features.sort_unstable();

        // Random draws happen here, sequentially, so parallel scoring below
        // stays reproducible for a given seed.
        let probes: Vec<Probe> = match self.params.splitter {
            Splitter::Best => features.into_iter().map(Probe::Exhaustive).collect(),
            Splitter::Random => features
                .into_iter()
                .filter_map(|f| {
                    self.random_threshold(indices, f)
                        .map(|t| Probe::Threshold(f, t))
                })
                .collect(),
        };

        let this = &*self;
        let candidates: Vec<Option<Candidate>> = probes
            .par_iter()
            .map(|probe| this.evaluate(*probe, indices))
            .collect();

        let mut best: Option<Candidate> = None;
        for candidate in candidates.into_iter().flatten() {
            if best.map_or(true, |b| candidate.impurity < b.impurity) {
                best = Some(candidate);
            }
            if best.is_some_and(|b| b.impurity <= IMPURITY_TOLERANCE) {
                break;
            }
        }
        best
    }

    fn random_threshold(&mut self, indices: &[usize], feature_idx: usize) -> Option<f32> {
        let samples = self.dataset.samples();
        let values = indices.iter().map(|&i| samples.get(i, feature_idx));
        match self.dataset.column_type(feature_idx) {
            ColumnType::Continuous => {
                let (min, max) = values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
                if !min.is_finite() || !max.is_finite() || max <= min {
                    return None;
                }
                // Interpolated in f64: `max - min` can overflow f32.
                let t: f64 = self.rng.gen();
                let lo = f64::from(min);
                let threshold = (lo + t * (f64::from(max) - lo)) as f32;
                Some(threshold.clamp(min, max))
            }
            ColumnType::Categorical => {
                let categories = distinct_sorted(values);
                if categories.len() < 2 {
                    return None;
                }
                Some(categories[self.rng.gen_range(0..categories.len())])
            }
        }
    }

    fn evaluate(&self, probe: Probe, indices: &[usize]) -> Option<Candidate> {
        match probe {
            Probe::Exhaustive(f) => match self.dataset.column_type(f) {
                ColumnType::Continuous => self.best_threshold(f, indices),
                ColumnType::Categorical => self.best_category(f, indices),
            },
            Probe::Threshold(f, threshold) => {
                self.score_partition(f, threshold, indices)
                    .map(|impurity| Candidate {
                        feature_idx: f,
                        threshold,
                        impurity,
                    })
            }
        }
    }

    /// Sweeps sorted values; every boundary between distinct values is a candidate.
    fn best_threshold(&self, feature_idx: usize, indices: &[usize]) -> Option<Candidate> {
        let samples = self.dataset.samples();
        let mut order = indices.to_vec();
        // NaN never goes left, so it sorts after every number whatever its sign.
        order.sort_by(|&a, &b| {
            let (va, vb) = (samples.get(a, feature_idx), samples.get(b, feature_idx));
            va.is_nan().cmp(&vb.is_nan()).then(va.total_cmp(&vb))
        });

        let values: Vec<f32> = order.iter().map(|&i| samples.get(i, feature_idx)).collect();
        let labels: Vec<C::Label> = order.iter().map(|&i| self.dataset.labels()[i]).collect();
        let weights: Vec<f32> = order.iter().map(|&i| self.weights[i]).collect();

        let n = order.len();
        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<Candidate> = None;

        for k in min_leaf..=n.saturating_sub(min_leaf) {
            let (lo, hi) = match (k.checked_sub(1), k < n) {
                (Some(prev), true) => (values[prev], values[k]),
                _ => continue,
            };
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                continue;
            }
            let threshold = midpoint(lo, hi);
            let impurity =
                self.split_impurity(&labels[..k], &weights[..k], &labels[k..], &weights[k..]);
            if best.map_or(true, |b| impurity < b.impurity) {
                best = Some(Candidate {
                    feature_idx,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }

    fn best_category(&self, feature_idx: usize, indices: &[usize]) -> Option<Candidate> {
        let samples = self.dataset.samples();
        let categories = distinct_sorted(indices.iter().map(|&i| samples.get(i, feature_idx)));
        if categories.len() < 2 {
            return None;
        }

        let mut best: Option<Candidate> = None;
        for category in categories {
            let Some(impurity) = self.score_partition(feature_idx, category, indices) else {
                continue;
            };
            if best.map_or(true, |b| impurity < b.impurity) {
                best = Some(Candidate {
                    feature_idx,
                    threshold: category,
                    impurity,
                });
            }
        }
        best
    }

    /// Impurity of splitting `indices` at `threshold`, if both sides are large enough.
    fn score_partition(&self, feature_idx: usize, threshold: f32, indices: &[usize]) -> Option<f32> {
        let samples = self.dataset.samples();
        let column_type = self.dataset.column_type(feature_idx);
        let labels = self.dataset.labels();

        let (mut left_labels, mut left_weights) = (Vec::new(), Vec::new());
        let (mut right_labels, mut right_weights) = (Vec::new(), Vec::new());
        for &i in indices {
            if goes_left(column_type, samples.get(i, feature_idx), threshold) {
                left_labels.push(labels[i]);
                left_weights.push(self.weights[i]);
            } else {
                right_labels.push(labels[i]);
                right_weights.push(self.weights[i]);
            }
        }

        let min_leaf = self.params.min_samples_leaf;
        if left_labels.len() < min_leaf || right_labels.len() < min_leaf {
            return None;
        }
        Some(self.split_impurity(&left_labels, &left_weights, &right_labels, &right_weights))
    }

    /// Group impurities averaged by group weight.
    fn split_impurity(
        &self,
        left_labels: &[C::Label],
        left_weights: &[f32],
        right_labels: &[C::Label],
        right_weights: &[f32],
    ) -> f32 {
        let w_left: f32 = left_weights.iter().sum();
        let w_right: f32 = right_weights.iter().sum();
        let total = w_left + w_right;
        if total <= 0.0 {
            return 0.0;
        }
        (w_left * self.criterion.impurity(left_labels, left_weights)
            + w_right * self.criterion.impurity(right_labels, right_weights))
            / total
    }
}

/// A threshold `t` with `lo < t <= hi`, as close to halfway as f32 allows.
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = lo * 0.5 + hi * 0.5;
    if mid > lo && mid <= hi {
        mid
    } else {
        hi
    }
}

fn distinct_sorted(values: impl Iterator<Item = f32>) -> Vec<f32> {
    let mut out: Vec<f32> = values.filter(|v| !v.is_nan()).collect();
    out.sort_by(f32::total_cmp);
    out.dedup();
    out
}
