//! Binary classification metrics for churn evaluation.
//!
//! Continuous scores are thresholded at 0.5; accuracy, precision,
//! recall, F1, and the confusion-matrix counts are derived from the
//! resulting labels.

use crate::error::{AbandonoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed decision threshold applied to prediction scores.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Converts continuous scores to binary labels.
///
/// A score of at least 0.5 rounds to 1. Monotonic: raising a score never
/// flips its label from 1 to 0.
///
/// # Examples
///
/// ```
/// use abandono::metrics::threshold_scores;
///
/// assert_eq!(threshold_scores(&[0.2, 0.5, 0.81]), vec![0, 1, 1]);
/// ```
#[must_use]
pub fn threshold_scores(scores: &[f32]) -> Vec<usize> {
    scores
        .iter()
        .map(|&p| usize::from(p >= DECISION_THRESHOLD))
        .collect()
}

/// Confusion-matrix counts for binary labels (positive class = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// True positives: predicted 1, actual 1.
    pub tp: usize,
    /// False positives: predicted 1, actual 0.
    pub fp: usize,
    /// True negatives: predicted 0, actual 0.
    pub tn: usize,
    /// False negatives: predicted 0, actual 1.
    pub fn_: usize,
}

impl ConfusionCounts {
    /// Tallies counts from predicted and true binary labels.
    ///
    /// # Errors
    ///
    /// Returns an error if lengths differ, the input is empty, or any
    /// label is not 0/1.
    pub fn from_labels(y_pred: &[usize], y_true: &[usize]) -> Result<Self> {
        if y_pred.len() != y_true.len() {
            return Err(AbandonoError::ShapeMismatch {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err("Cannot compute metrics on empty labels".into());
        }
        if let Some(&bad) = y_pred.iter().chain(y_true.iter()).find(|&&l| l > 1) {
            return Err(format!("Labels must be 0 or 1, got {bad}").into());
        }

        let mut counts = Self {
            tp: 0,
            fp: 0,
            tn: 0,
            fn_: 0,
        };
        for (&pred, &actual) in y_pred.iter().zip(y_true.iter()) {
            match (pred, actual) {
                (1, 1) => counts.tp += 1,
                (1, 0) => counts.fp += 1,
                (0, 0) => counts.tn += 1,
                _ => counts.fn_ += 1,
            }
        }
        Ok(counts)
    }

    /// Total number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// accuracy = (TP + TN) / total
    #[must_use]
    pub fn accuracy(&self) -> f32 {
        (self.tp + self.tn) as f32 / self.total() as f32
    }

    /// precision = TP / (TP + FP), 0.0 when nothing was predicted positive.
    #[must_use]
    pub fn precision(&self) -> f32 {
        if self.tp + self.fp == 0 {
            0.0
        } else {
            self.tp as f32 / (self.tp + self.fp) as f32
        }
    }

    /// recall = TP / (TP + FN), 0.0 when no positives exist.
    #[must_use]
    pub fn recall(&self) -> f32 {
        if self.tp + self.fn_ == 0 {
            0.0
        } else {
            self.tp as f32 / (self.tp + self.fn_) as f32
        }
    }

    /// F1 = harmonic mean of precision and recall, 0.0 when both are 0.
    #[must_use]
    pub fn f1(&self) -> f32 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

/// The full evaluation output of a scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Confusion-matrix counts.
    pub counts: ConfusionCounts,
    /// Classification accuracy.
    pub accuracy: f32,
    /// Precision of the positive (churned) class.
    pub precision: f32,
    /// Recall of the positive (churned) class.
    pub recall: f32,
    /// F1 score of the positive (churned) class.
    pub f1: f32,
}

impl EvaluationReport {
    /// Builds a report from predicted and true binary labels.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ConfusionCounts::from_labels`].
    pub fn from_labels(y_pred: &[usize], y_true: &[usize]) -> Result<Self> {
        let counts = ConfusionCounts::from_labels(y_pred, y_true)?;
        Ok(Self {
            counts,
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
        })
    }

    /// Thresholds scores at 0.5 and builds a report against true labels.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ConfusionCounts::from_labels`].
    pub fn from_scores(scores: &[f32], y_true: &[usize]) -> Result<Self> {
        Self::from_labels(&threshold_scores(scores), y_true)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "accuracy {:.4}  precision {:.4}  recall {:.4}  f1 {:.4}",
            self.accuracy, self.precision, self.recall, self.f1
        )?;
        write!(
            f,
            "tp {}  fp {}  tn {}  fn {}",
            self.counts.tp, self.counts.fp, self.counts.tn, self.counts.fn_
        )
    }
}
