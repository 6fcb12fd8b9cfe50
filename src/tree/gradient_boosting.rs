//! Gradient-boosted binary classifier.
//!
//! Boosted trees with the binary logistic objective: an ensemble of
//! shallow regression trees fitted sequentially to pseudo-residuals.

use super::DecisionTreeRegressor;
use crate::error::{AbandonoError, Result};
use crate::primitives::Matrix;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Gradient-boosted trees for binary classification.
///
/// # Algorithm
///
/// 1. Initialize raw scores with the log-odds of the positive class.
/// 2. For each boosting round:
///    - compute pseudo-residuals `y - sigmoid(raw)`,
///    - draw a row subsample,
///    - fit a shallow regression tree to the residuals,
///    - add `learning_rate * tree_prediction` to the raw scores.
/// 3. `predict_proba` = sigmoid of the summed raw scores.
///
/// # Example
///
/// ```
/// use abandono::primitives::Matrix;
/// use abandono::tree::GradientBoostedClassifier;
///
/// let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0])
///     .expect("valid dims");
/// let y = vec![0, 0, 0, 1, 1, 1];
///
/// let mut model = GradientBoostedClassifier::new()
///     .with_num_round(20)
///     .with_max_depth(2)
///     .with_seed(42);
/// model.fit(&x, &y).expect("fit should succeed");
/// assert_eq!(model.predict(&x).expect("predict"), y);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    /// Number of boosting rounds (trees).
    num_round: usize,
    /// Learning rate (shrinkage), often called eta.
    learning_rate: f32,
    /// Maximum depth of each tree.
    max_depth: usize,
    /// Fraction of rows drawn (without replacement) per round.
    subsample: f32,
    /// L2 leaf regularization term passed to each tree.
    lambda: f32,
    /// Seed for the per-round row subsampling.
    seed: u64,
    /// Initial raw score (log-odds of the positive class).
    init_score: f32,
    /// Feature count seen at fit time; prediction input must match.
    n_features: usize,
    /// The fitted ensemble.
    trees: Vec<DecisionTreeRegressor>,
}

impl GradientBoostedClassifier {
    /// Creates a classifier with default parameters.
    ///
    /// Defaults: 100 rounds, learning rate 0.1, max depth 3, subsample
    /// 1.0, lambda 0.0, seed 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            num_round: 100,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
            lambda: 0.0,
            seed: 0,
            init_score: 0.0,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    /// Sets the number of boosting rounds.
    #[must_use]
    pub fn with_num_round(mut self, num_round: usize) -> Self {
        self.num_round = num_round;
        self
    }

    /// Sets the learning rate (shrinkage). Typical values: 0.01 - 0.3.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the maximum depth of each tree. Typical values: 3-8.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the per-round row subsample fraction.
    #[must_use]
    pub fn with_subsample(mut self, subsample: f32) -> Self {
        self.subsample = subsample;
        self
    }

    /// Sets the L2 leaf regularization term.
    #[must_use]
    pub fn with_l2_regularization(mut self, lambda: f32) -> Self {
        self.lambda = lambda;
        self
    }

    /// Sets the subsampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the number of fitted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    fn validate_hyperparameters(&self) -> Result<()> {
        if self.num_round == 0 {
            return Err(AbandonoError::InvalidHyperparameter {
                param: "num_round".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(AbandonoError::InvalidHyperparameter {
                param: "learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                constraint: "0 < eta <= 1".to_string(),
            });
        }
        if self.subsample <= 0.0 || self.subsample > 1.0 {
            return Err(AbandonoError::InvalidHyperparameter {
                param: "subsample".to_string(),
                value: self.subsample.to_string(),
                constraint: "0 < subsample <= 1".to_string(),
            });
        }
        if self.lambda < 0.0 {
            return Err(AbandonoError::InvalidHyperparameter {
                param: "lambda".to_string(),
                value: self.lambda.to_string(),
                constraint: ">= 0".to_string(),
            });
        }
        Ok(())
    }

    /// Trains the ensemble on binary labels (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns an error on invalid hyperparameters, mismatched sample
    /// counts, or empty data.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        self.validate_hyperparameters()?;

        let n_samples = x.n_rows();
        if n_samples != y.len() {
            return Err("x and y must have the same number of samples".into());
        }
        if n_samples == 0 {
            return Err("Cannot fit with 0 samples".into());
        }
        if let Some(&bad) = y.iter().find(|&&label| label > 1) {
            return Err(format!("Labels must be 0 or 1, got {bad}").into());
        }
        self.n_features = x.n_cols();

        let y_float: Vec<f32> = y.iter().map(|&label| label as f32).collect();

        // Log-odds initialization, clamped for single-class data.
        let positive = y_float.iter().filter(|&&label| label == 1.0).count();
        let p = positive as f32 / n_samples as f32;
        self.init_score = if p > 0.0 && p < 1.0 {
            (p / (1.0 - p)).ln()
        } else if p >= 1.0 {
            5.0
        } else {
            -5.0
        };

        let mut raw_scores = vec![self.init_score; n_samples];
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        let n_drawn = ((n_samples as f32 * self.subsample).floor() as usize).max(1);

        self.trees = Vec::with_capacity(self.num_round);

        for _ in 0..self.num_round {
            let residuals: Vec<f32> = y_float
                .iter()
                .zip(raw_scores.iter())
                .map(|(&yi, &raw)| yi - Self::sigmoid(raw))
                .collect();

            // Row subsample without replacement for this round.
            let mut indices: Vec<usize> = (0..n_samples).collect();
            indices.shuffle(&mut rng);
            indices.truncate(n_drawn);

            let round_x = x.select_rows(&indices);
            let round_residuals: Vec<f32> = indices.iter().map(|&i| residuals[i]).collect();

            let mut tree = DecisionTreeRegressor::new()
                .with_max_depth(self.max_depth)
                .with_l2_leaf_regularization(self.lambda);
            tree.fit(
                &round_x,
                &crate::primitives::Vector::from_vec(round_residuals),
            )?;

            let tree_preds = tree.predict(x);
            for (raw, &step) in raw_scores.iter_mut().zip(tree_preds.iter()) {
                *raw += self.learning_rate * step;
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    /// Predicts the probability of the positive class for each sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the input does not
    /// have the feature count seen at fit time.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<f32>> {
        if self.trees.is_empty() {
            return Err(AbandonoError::NotFitted {
                component: "GradientBoostedClassifier".to_string(),
            });
        }
        if x.n_cols() != self.n_features {
            return Err(AbandonoError::ShapeMismatch {
                expected: format!("{} feature columns", self.n_features),
                actual: format!("{} feature columns", x.n_cols()),
            });
        }

        let n_samples = x.n_rows();
        let mut raw_scores = vec![self.init_score; n_samples];

        for tree in &self.trees {
            let tree_preds = tree.predict(x);
            for (raw, &step) in raw_scores.iter_mut().zip(tree_preds.iter()) {
                *raw += self.learning_rate * step;
            }
        }

        Ok(raw_scores.iter().map(|&raw| Self::sigmoid(raw)).collect())
    }

    /// Predicts binary labels by thresholding probabilities at 0.5.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let probas = self.predict_proba(x)?;
        Ok(probas.iter().map(|&p| usize::from(p >= 0.5)).collect())
    }

    /// Saves the model to a binary file using bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Loads a model from a binary file.
    ///
    /// # Errors
    ///
    /// Returns an error if file reading or deserialization fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        let model = bincode::deserialize(&bytes)?;
        Ok(model)
    }
}

impl Default for GradientBoostedClassifier {
    fn default() -> Self {
        Self::new()
    }
}
