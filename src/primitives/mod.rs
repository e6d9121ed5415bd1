//! Core compute primitives (Vector, Matrix).
//!
//! Feature matrices are row-major `f32` grids; targets and predictions are
//! carried as `Vector<f32>` or plain slices.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
