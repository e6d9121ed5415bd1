//! Labeled datasets for supervised training.
//!
//! A [`Labeled`] dataset pairs a row-major feature matrix with one label per
//! row and a type tag per column. Categorical columns carry their categories
//! as `f32` codes; only equality is meaningful on them.

use crate::error::{CartboostError, Result};
use crate::primitives::{Matrix, Vector};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the values of a feature column are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColumnType {
    /// Ordered numeric values, split by threshold.
    #[default]
    Continuous,
    /// Unordered category codes, split by equality.
    Categorical,
}

/// A feature matrix with a parallel label array.
///
/// `T` is `usize` for class labels and `f32` for regression targets.
///
/// # Examples
///
/// ```
/// use cartboost::data::Labeled;
/// use cartboost::primitives::Matrix;
///
/// let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 5.0, 6.0]).expect("valid matrix");
/// let data = Labeled::new(x, vec![0_usize, 0, 1, 1]).expect("labels match rows");
///
/// let (left, right) = data.partition(0, 3.5);
/// assert_eq!(left.labels(), &[0, 0]);
/// assert_eq!(right.labels(), &[1, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labeled<T> {
    samples: Matrix<f32>,
    labels: Vec<T>,
    column_types: Vec<ColumnType>,
}

impl<T: Copy> Labeled<T> {
    /// Creates a dataset whose columns are all continuous.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the label count differs from the row count.
    pub fn new(samples: Matrix<f32>, labels: Vec<T>) -> Result<Self> {
        if samples.n_rows() != labels.len() {
            return Err(CartboostError::dimension_mismatch(
                "labels",
                samples.n_rows(),
                labels.len(),
            ));
        }
        let column_types = vec![ColumnType::Continuous; samples.n_cols()];
        Ok(Self {
            samples,
            labels,
            column_types,
        })
    }

    /// Replaces the per-column types.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if there is not exactly one type per column.
    pub fn with_column_types(mut self, column_types: Vec<ColumnType>) -> Result<Self> {
        if column_types.len() != self.samples.n_cols() {
            return Err(CartboostError::dimension_mismatch(
                "column_types",
                self.samples.n_cols(),
                column_types.len(),
            ));
        }
        self.column_types = column_types;
        Ok(self)
    }

    /// Number of samples.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.samples.n_rows()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.samples.n_cols()
    }

    /// Whether the dataset has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The feature matrix.
    #[must_use]
    pub fn samples(&self) -> &Matrix<f32> {
        &self.samples
    }

    /// The labels, one per row.
    #[must_use]
    pub fn labels(&self) -> &[T] {
        &self.labels
    }

    /// Values of one feature column.
    #[must_use]
    pub fn column(&self, idx: usize) -> Vector<f32> {
        self.samples.column(idx)
    }

    /// Type of one feature column.
    #[must_use]
    pub fn column_type(&self, idx: usize) -> ColumnType {
        self.column_types[idx]
    }

    /// Types of every feature column.
    #[must_use]
    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    /// Rows at `indices`, in order. Indices may repeat.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            samples: self.samples.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            column_types: self.column_types.clone(),
        }
    }

    /// Splits rows on one column.
    ///
    /// Continuous columns send `value < threshold` left, categorical columns
    /// send `value == category` left.
    #[must_use]
    pub fn partition(&self, column: usize, value: f32) -> (Self, Self) {
        let column_type = self.column_types[column];
        let (left, right): (Vec<usize>, Vec<usize>) = (0..self.n_rows())
            .partition(|&row| goes_left(column_type, self.samples.get(row, column), value));
        (self.subset(&left), self.subset(&right))
    }

    /// Uniform random rows without replacement. `size` is capped at the row count.
    pub fn random_subset<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Self {
        let size = size.min(self.n_rows());
        let indices = rand::seq::index::sample(rng, self.n_rows(), size).into_vec();
        self.subset(&indices)
    }

    /// Random rows drawn with replacement, each row chosen with probability
    /// proportional to its weight.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight count differs from the row count, or if
    /// the weights are negative, non-finite or all zero.
    pub fn random_weighted_subset_with_replacement<R: Rng + ?Sized>(
        &self,
        size: usize,
        weights: &[f32],
        rng: &mut R,
    ) -> Result<Self> {
        if weights.len() != self.n_rows() {
            return Err(CartboostError::dimension_mismatch(
                "weights",
                self.n_rows(),
                weights.len(),
            ));
        }
        let dist = WeightedIndex::new(weights).map_err(|e| CartboostError::InvalidInput {
            message: format!("cannot sample from weights: {e}"),
        })?;
        let indices: Vec<usize> = (0..size).map(|_| dist.sample(rng)).collect();
        Ok(self.subset(&indices))
    }

    /// Shuffles the rows and splits them into `(first left_size rows, rest)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `left_size` exceeds the row count.
    pub fn shuffled_split<R: Rng + ?Sized>(
        &self,
        left_size: usize,
        rng: &mut R,
    ) -> Result<(Self, Self)> {
        if left_size > self.n_rows() {
            return Err(CartboostError::InvalidInput {
                message: format!(
                    "cannot take {left_size} rows from a dataset of {}",
                    self.n_rows()
                ),
            });
        }
        let mut order: Vec<usize> = (0..self.n_rows()).collect();
        order.shuffle(rng);
        let (left, right) = order.split_at(left_size);
        Ok((self.subset(left), self.subset(right)))
    }
}

impl Labeled<usize> {
    /// Distinct class labels, sorted ascending.
    #[must_use]
    pub fn possible_outcomes(&self) -> Vec<usize> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}

/// Routing rule shared by dataset partitioning and tree traversal.
#[inline]
pub(crate) fn goes_left(column_type: ColumnType, value: f32, threshold: f32) -> bool {
    match column_type {
        ColumnType::Continuous => value < threshold,
        ColumnType::Categorical => value == threshold,
    }
}
