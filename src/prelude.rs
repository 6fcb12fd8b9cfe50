//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use abandono::prelude::*;
//! ```

pub use crate::data::{DataFrame, RawDataset};
pub use crate::error::{AbandonoError, Result};
pub use crate::metrics::{ConfusionCounts, EvaluationReport};
pub use crate::model_selection::{train_valid_test_split, DatasetSplit, Partition};
pub use crate::pipeline::{ChurnPipeline, PipelineConfig, PipelineOutcome};
pub use crate::platform::{
    BatchScoringClient, BatchScoringJobSpec, BoostingHyperparameters, JobStatus, LocalPlatform,
    TrainingClient, TrainingJobSpec,
};
pub use crate::preprocessing::{prepare_churn_table, OneHotEncoder, PreparedTable};
pub use crate::primitives::{Matrix, Vector};
pub use crate::tree::{DecisionTreeRegressor, GradientBoostedClassifier};
