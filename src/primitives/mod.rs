//! Core numeric primitives (Vector, Matrix).
//!
//! Row-major containers backing the feature tables, the boosted-tree
//! learners, and the metric computations.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
