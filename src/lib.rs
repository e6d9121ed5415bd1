//! Cartboost: CART decision trees and boosting ensembles in pure Rust.
//!
//! Cartboost grows binary classification and regression trees with pluggable
//! impurity criteria, and combines them into AdaBoost and stochastic gradient
//! boosting ensembles with holdout-based early stopping.
//!
//! # Quick Start
//!
//! ```
//! use cartboost::prelude::*;
//!
//! // Training data (y = 2*x + 1)
//! let x = Matrix::from_vec(30, 1, (0..30).map(|v| v as f32).collect()).unwrap();
//! let y: Vec<f32> = (0..30).map(|v| 2.0 * v as f32 + 1.0).collect();
//! let data = Labeled::new(x.clone(), y).unwrap();
//!
//! // Train a gradient boosted ensemble of regression trees
//! let mut model = GradientBoostingRegressor::new()
//!     .with_n_estimators(100)
//!     .with_learning_rate(0.3)
//!     .with_random_state(42);
//! model.train(&data).unwrap();
//!
//! let predictions = model.predict(&x).unwrap();
//! assert_eq!(predictions.len(), 30);
//! assert!(!model.steps().is_empty());
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`data`]: Labeled datasets with per-column types
//! - [`tree`]: CART classification and regression trees, extra trees
//! - [`ensemble`]: AdaBoost and gradient boosting
//! - [`dummy`]: Constant-prediction baselines
//! - [`metrics`]: Evaluation metrics
//! - [`traits`]: Learner capabilities shared by trees and ensembles
//!
//! # Logging
//!
//! Training progress is reported through the [`log`] facade: one `debug!`
//! line per boosting round, `info!` when training finishes and `warn!` when
//! a round degenerates. Install any `log` backend to see it.

pub mod data;
pub mod dummy;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod prelude;
pub mod primitives;
pub mod traits;
pub mod tree;

pub use error::{CartboostError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::{Learner, Metric, Probabilistic, RanksFeatures, Traced};
