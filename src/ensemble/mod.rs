//! Boosting ensembles built on top of the tree learners.
//!
//! - [`AdaBoostClassifier`]: reweights samples after every round so later
//!   learners focus on earlier mistakes
//! - [`GradientBoostingRegressor`]: fits each new booster to the residuals
//!   of the running prediction, with holdout-based early stopping
//!
//! Both are generic over their learners through [`crate::traits::Learner`]
//! and train a fresh clone of the configured template every round.

mod adaboost;
mod early_stopping;
mod gradient_boosting;

pub use adaboost::{AdaBoostClassifier, DEFAULT_EPSILON};
pub use early_stopping::EarlyStopping;
pub use gradient_boosting::GradientBoostingRegressor;
