//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use cartboost::prelude::*;
//! ```

pub use crate::data::{ColumnType, Labeled};
pub use crate::dummy::{DummyRegressor, DummyStrategy};
pub use crate::ensemble::{AdaBoostClassifier, EarlyStopping, GradientBoostingRegressor};
pub use crate::error::CartboostError;
pub use crate::metrics::{accuracy, mae, mse, r_squared, rmse, RegressionMetric};
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{Learner, Metric, Probabilistic, RanksFeatures, Traced};
pub use crate::tree::{
    ClassificationCriterion, DecisionTreeClassifier, DecisionTreeRegressor, MaxFeatures,
    RegressionCriterion, Splitter,
};
