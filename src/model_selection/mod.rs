//! Deterministic partitioning of the prepared table.
//!
//! One seeded shuffle produces disjoint train/validation/test partitions
//! whose sizes sum to the input row count. The partitions are built once
//! and never resampled.

use crate::data::DataFrame;
use crate::error::{AbandonoError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Training fraction used by the churn workflow.
pub const TRAIN_FRACTION: f32 = 0.7;
/// Validation fraction used by the churn workflow.
pub const VALIDATION_FRACTION: f32 = 0.2;

/// One partition of the dataset: features with aligned labels.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Feature rows of this partition.
    pub features: DataFrame,
    /// Labels aligned with the feature rows.
    pub labels: Vec<usize>,
}

impl Partition {
    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }
}

/// The immutable three-way split of the prepared table.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    /// Training partition.
    pub train: Partition,
    /// Validation partition.
    pub validation: Partition,
    /// Held-out test partition.
    pub test: Partition,
}

/// Validates fractions and computes the three partition sizes.
fn partition_sizes(
    n_samples: usize,
    train_frac: f32,
    valid_frac: f32,
) -> Result<(usize, usize, usize)> {
    for (param, value) in [("train_frac", train_frac), ("valid_frac", valid_frac)] {
        if value <= 0.0 || value >= 1.0 {
            return Err(AbandonoError::InvalidHyperparameter {
                param: param.to_string(),
                value: value.to_string(),
                constraint: "0 < fraction < 1".to_string(),
            });
        }
    }
    if train_frac + valid_frac >= 1.0 {
        return Err(AbandonoError::InvalidHyperparameter {
            param: "train_frac + valid_frac".to_string(),
            value: (train_frac + valid_frac).to_string(),
            constraint: "sum < 1 so the test partition is non-empty".to_string(),
        });
    }

    let n_train = (n_samples as f32 * train_frac).round() as usize;
    let n_valid = (n_samples as f32 * valid_frac).round() as usize;
    if n_train == 0 || n_valid == 0 || n_train + n_valid >= n_samples {
        return Err(format!(
            "Split would leave an empty partition (n_samples={n_samples}, n_train={n_train}, n_valid={n_valid})"
        )
        .into());
    }
    Ok((n_train, n_valid, n_samples - n_train - n_valid))
}

/// Shuffles row indices with a fixed seed.
fn shuffle_indices(n_samples: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

/// Extracts one partition by row indices.
fn extract_partition(
    features: &DataFrame,
    labels: &[usize],
    indices: &[usize],
) -> Result<Partition> {
    let part_features = features.select_rows(indices)?;
    let part_labels = indices.iter().map(|&i| labels[i]).collect();
    Ok(Partition {
        features: part_features,
        labels: part_labels,
    })
}

/// Splits features and labels into train/validation/test partitions.
///
/// A single seeded shuffle assigns every row to exactly one partition;
/// the same seed reproduces the same split.
///
/// # Errors
///
/// Returns an error if the fractions are outside (0, 1), sum to 1 or
/// more, feature and label counts differ, or any partition would be
/// empty.
///
/// # Example
///
/// ```
/// use abandono::data::DataFrame;
/// use abandono::model_selection::train_valid_test_split;
/// use abandono::primitives::Vector;
///
/// let features = DataFrame::new(vec![(
///     "x".to_string(),
///     Vector::from_vec((0..10).map(|i| i as f32).collect()),
/// )]).expect("valid frame");
/// let labels: Vec<usize> = (0..10).map(|i| i % 2).collect();
///
/// let split = train_valid_test_split(&features, &labels, 0.7, 0.2, 42)
///     .expect("split should succeed");
/// assert_eq!(split.train.n_rows(), 7);
/// assert_eq!(split.validation.n_rows(), 2);
/// assert_eq!(split.test.n_rows(), 1);
/// ```
pub fn train_valid_test_split(
    features: &DataFrame,
    labels: &[usize],
    train_frac: f32,
    valid_frac: f32,
    seed: u64,
) -> Result<DatasetSplit> {
    let n_samples = features.n_rows();
    if n_samples != labels.len() {
        return Err(AbandonoError::ShapeMismatch {
            expected: format!("{n_samples} labels"),
            actual: format!("{} labels", labels.len()),
        });
    }

    let (n_train, n_valid, _) = partition_sizes(n_samples, train_frac, valid_frac)?;
    let indices = shuffle_indices(n_samples, seed);

    let train_idx = &indices[..n_train];
    let valid_idx = &indices[n_train..n_train + n_valid];
    let test_idx = &indices[n_train + n_valid..];

    Ok(DatasetSplit {
        train: extract_partition(features, labels, train_idx)?,
        validation: extract_partition(features, labels, valid_idx)?,
        test: extract_partition(features, labels, test_idx)?,
    })
}
