//! Boosted-tree learners.
//!
//! A CART regression tree (variance-reduction splits, mean leaves with
//! optional L2 shrinkage) serves as the weak learner for
//! [`GradientBoostedClassifier`], the crate's churn model.

mod gradient_boosting;

pub use gradient_boosting::GradientBoostedClassifier;

use crate::error::Result;
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};

/// Leaf node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionLeaf {
    /// Predicted value for this leaf.
    pub value: f32,
    /// Number of training samples in this leaf.
    pub n_samples: usize,
}

/// Internal node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionNode {
    /// Index of the feature to split on.
    pub feature_idx: usize,
    /// Threshold value for the split.
    pub threshold: f32,
    /// Left subtree (samples where feature <= threshold).
    pub left: Box<RegressionTreeNode>,
    /// Right subtree (samples where feature > threshold).
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node with split condition.
    Node(RegressionNode),
    /// Leaf node with value prediction.
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }
}

/// Decision tree regressor using the CART algorithm.
///
/// Splits minimize weighted child variance; leaves predict the shrunken
/// mean `sum / (n + lambda)` of their targets, where lambda is the L2
/// leaf regularization term (0 disables shrinkage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    tree: Option<RegressionTreeNode>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    lambda: f32,
}

impl DecisionTreeRegressor {
    /// Creates a new decision tree regressor with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            lambda: 0.0,
        }
    }

    /// Sets the maximum depth of the tree.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the minimum number of samples required to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the minimum number of samples required at a leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Sets the L2 leaf regularization term.
    #[must_use]
    pub fn with_l2_leaf_regularization(mut self, lambda: f32) -> Self {
        self.lambda = lambda.max(0.0);
        self
    }

    /// Returns the fitted tree depth, if fitted.
    #[must_use]
    pub fn tree_depth(&self) -> Option<usize> {
        self.tree.as_ref().map(RegressionTreeNode::depth)
    }

    /// Fits the tree to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if sample counts mismatch or the data is empty.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let (n_rows, _) = x.shape();
        if n_rows != y.len() {
            return Err("Number of samples in X and y must match".into());
        }
        if n_rows == 0 {
            return Err("Cannot fit with zero samples".into());
        }

        self.tree = Some(build_regression_tree(
            x,
            y.as_slice(),
            0,
            self.max_depth,
            self.min_samples_split,
            self.min_samples_leaf,
            self.lambda,
        ));
        Ok(())
    }

    /// Predicts target values for samples.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit()`.
    #[must_use]
    pub fn predict(&self, x: &Matrix<f32>) -> Vector<f32> {
        let (n_samples, n_features) = x.shape();
        let mut predictions = Vec::with_capacity(n_samples);

        for row in 0..n_samples {
            let mut sample = Vec::with_capacity(n_features);
            for col in 0..n_features {
                sample.push(x.get(row, col));
            }
            predictions.push(self.predict_one(&sample));
        }

        Vector::from_vec(predictions)
    }

    fn predict_one(&self, x: &[f32]) -> f32 {
        let tree = self.tree.as_ref().expect("Model not fitted");

        let mut node = tree;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return leaf.value,
                RegressionTreeNode::Node(internal) => {
                    if x[internal.feature_idx] <= internal.threshold {
                        node = &internal.left;
                    } else {
                        node = &internal.right;
                    }
                }
            }
        }
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

// Tree building helpers

fn mean_f32(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

fn variance_f32(y: &[f32]) -> f32 {
    if y.len() <= 1 {
        return 0.0;
    }
    let mean = mean_f32(y);
    y.iter().map(|&val| (val - mean).powi(2)).sum::<f32>() / y.len() as f32
}

/// Weighted child variance of a candidate split.
fn split_variance(y_left: &[f32], y_right: &[f32]) -> f32 {
    let n_left = y_left.len() as f32;
    let n_right = y_right.len() as f32;
    let n_total = n_left + n_right;
    if n_total == 0.0 {
        return 0.0;
    }
    (n_left / n_total) * variance_f32(y_left) + (n_right / n_total) * variance_f32(y_right)
}

/// Sorted unique values of one feature column.
fn unique_feature_values(x: &Matrix<f32>, feature_idx: usize) -> Vec<f32> {
    let mut values: Vec<f32> = x.column(feature_idx).iter().copied().collect();
    values.sort_by(f32::total_cmp);
    values.dedup();
    values
}

/// Finds the (feature, threshold) pair with the greatest variance
/// reduction, honoring the min-samples-per-leaf constraint.
fn find_best_regression_split(
    x: &Matrix<f32>,
    y: &[f32],
    min_samples_leaf: usize,
) -> Option<(usize, f32)> {
    let (n_samples, n_features) = x.shape();
    if n_samples < 2 {
        return None;
    }

    let current = variance_f32(y);
    let mut best_gain = 0.0;
    let mut best: Option<(usize, f32)> = None;

    for feature_idx in 0..n_features {
        let unique = unique_feature_values(x, feature_idx);
        for pair in unique.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;

            let mut y_left = Vec::new();
            let mut y_right = Vec::new();
            for row in 0..n_samples {
                if x.get(row, feature_idx) <= threshold {
                    y_left.push(y[row]);
                } else {
                    y_right.push(y[row]);
                }
            }
            if y_left.len() < min_samples_leaf || y_right.len() < min_samples_leaf {
                continue;
            }

            let gain = current - split_variance(&y_left, &y_right);
            if gain > best_gain {
                best_gain = gain;
                best = Some((feature_idx, threshold));
            }
        }
    }

    best
}

/// Leaf value with L2 shrinkage: sum / (n + lambda).
fn leaf_value(y: &[f32], lambda: f32) -> f32 {
    if y.is_empty() {
        return 0.0;
    }
    y.iter().sum::<f32>() / (y.len() as f32 + lambda)
}

fn make_leaf(y: &[f32], lambda: f32) -> RegressionTreeNode {
    RegressionTreeNode::Leaf(RegressionLeaf {
        value: leaf_value(y, lambda),
        n_samples: y.len(),
    })
}

#[allow(clippy::too_many_arguments)]
fn build_regression_tree(
    x: &Matrix<f32>,
    y: &[f32],
    depth: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    lambda: f32,
) -> RegressionTreeNode {
    let n_samples = y.len();

    if n_samples < min_samples_split {
        return make_leaf(y, lambda);
    }
    if let Some(max_d) = max_depth {
        if depth >= max_d {
            return make_leaf(y, lambda);
        }
    }
    if variance_f32(y) < 1e-12 {
        return make_leaf(y, lambda);
    }

    let Some((feature_idx, threshold)) = find_best_regression_split(x, y, min_samples_leaf) else {
        return make_leaf(y, lambda);
    };

    let mut left_indices = Vec::new();
    let mut right_indices = Vec::new();
    for row in 0..n_samples {
        if x.get(row, feature_idx) <= threshold {
            left_indices.push(row);
        } else {
            right_indices.push(row);
        }
    }
    if left_indices.is_empty() || right_indices.is_empty() {
        return make_leaf(y, lambda);
    }

    let left_x = x.select_rows(&left_indices);
    let right_x = x.select_rows(&right_indices);
    let left_y: Vec<f32> = left_indices.iter().map(|&i| y[i]).collect();
    let right_y: Vec<f32> = right_indices.iter().map(|&i| y[i]).collect();

    let left = build_regression_tree(
        &left_x,
        &left_y,
        depth + 1,
        max_depth,
        min_samples_split,
        min_samples_leaf,
        lambda,
    );
    let right = build_regression_tree(
        &right_x,
        &right_y,
        depth + 1,
        max_depth,
        min_samples_split,
        min_samples_leaf,
        lambda,
    );

    RegressionTreeNode::Node(RegressionNode {
        feature_idx,
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_a_step_function() {
        let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]).expect("valid dims");
        let y = Vector::from_slice(&[0.0, 0.0, 0.0, 5.0, 5.0, 5.0]);

        let mut tree = DecisionTreeRegressor::new().with_max_depth(2);
        tree.fit(&x, &y).expect("fit should succeed");

        let preds = tree.predict(&x);
        assert!((preds[0] - 0.0).abs() < 1e-5);
        assert!((preds[5] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_max_depth_zero_predicts_mean() {
        let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("valid dims");
        let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);

        let mut tree = DecisionTreeRegressor::new().with_max_depth(0);
        tree.fit(&x, &y).expect("fit should succeed");

        let preds = tree.predict(&x);
        for &p in preds.iter() {
            assert!((p - 2.5).abs() < 1e-5);
        }
        assert_eq!(tree.tree_depth(), Some(0));
    }

    #[test]
    fn test_l2_shrinkage_pulls_leaf_toward_zero() {
        let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("valid dims");
        let y = Vector::from_slice(&[4.0, 4.0]);

        let mut plain = DecisionTreeRegressor::new().with_max_depth(0);
        plain.fit(&x, &y).expect("fit should succeed");
        let mut shrunk = DecisionTreeRegressor::new()
            .with_max_depth(0)
            .with_l2_leaf_regularization(2.0);
        shrunk.fit(&x, &y).expect("fit should succeed");

        let p_plain = plain.predict(&x)[0];
        let p_shrunk = shrunk.predict(&x)[0];
        assert!((p_plain - 4.0).abs() < 1e-5);
        assert!((p_shrunk - 2.0).abs() < 1e-5); // 8 / (2 + 2)
    }

    #[test]
    fn test_fit_rejects_mismatched_samples() {
        let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("valid dims");
        let y = Vector::from_slice(&[1.0]);
        assert!(DecisionTreeRegressor::new().fit(&x, &y).is_err());
    }

    #[test]
    fn test_fit_rejects_empty() {
        let x = Matrix::from_vec(0, 1, vec![]).expect("valid dims");
        let y = Vector::from_vec(vec![]);
        assert!(DecisionTreeRegressor::new().fit(&x, &y).is_err());
    }

    #[test]
    fn test_min_samples_leaf_limits_splits() {
        let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("valid dims");
        let y = Vector::from_slice(&[0.0, 0.0, 1.0, 1.0]);

        let mut tree = DecisionTreeRegressor::new().with_min_samples_leaf(3);
        tree.fit(&x, &y).expect("fit should succeed");
        // No split leaves both sides with >= 3 samples, so the root is a leaf.
        assert_eq!(tree.tree_depth(), Some(0));
    }
}
