//! End-to-end churn workflow: raw table in, evaluation report out.
//!
//! The pipeline owns the sequencing only. Preparation, splitting,
//! training, and scoring each live in their own module; the platform
//! work goes through the [`TrainingClient`] and [`BatchScoringClient`]
//! traits so the same pipeline code drives the local emulation and a
//! managed backend alike.

use crate::data::{schema, DataFrame, RawDataset};
use crate::error::{AbandonoError, Result};
use crate::metrics::EvaluationReport;
use crate::model_selection::{
    train_valid_test_split, DatasetSplit, Partition, TRAIN_FRACTION, VALIDATION_FRACTION,
};
use crate::platform::{
    wait_for_completion, read_scores, BatchScoringClient, BatchScoringJobSpec,
    BoostingHyperparameters, TrainingClient, TrainingJobSpec,
};
use crate::preprocessing::prepare_churn_table;
use crate::primitives::Vector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delimited source table with the full churn schema.
    pub data_path: PathBuf,
    /// Directory receiving partition files, artifacts, and scores.
    pub work_dir: PathBuf,
    /// Name under which the trained model artifact is stored.
    pub model_name: String,
    /// Seed for the shuffle split and booster subsampling.
    pub seed: u64,
    /// Booster settings forwarded to the training job.
    pub hyperparameters: BoostingHyperparameters,
    /// Milliseconds between job status polls.
    pub poll_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("churn.csv"),
            work_dir: PathBuf::from("work"),
            model_name: "churn-gbt".to_string(),
            seed: 42,
            hyperparameters: BoostingHyperparameters::default(),
            poll_interval_ms: 100,
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Classification metrics on the held-out test partition.
    pub report: EvaluationReport,
    /// Raw probability scores for the test rows, in row order.
    pub scores: Vec<f32>,
    /// Where the trained model artifact was stored.
    pub artifact_location: PathBuf,
}

/// Drives the churn workflow against a platform backend.
pub struct ChurnPipeline<P> {
    config: PipelineConfig,
    platform: P,
}

impl<P> ChurnPipeline<P>
where
    P: TrainingClient + BatchScoringClient,
{
    /// Creates a pipeline over the given platform backend.
    pub fn new(config: PipelineConfig, platform: P) -> Self {
        Self { config, platform }
    }

    /// Runs the workflow end to end.
    ///
    /// Prepares the table, splits it 70/20/10, writes partition files,
    /// trains through the platform, batch-scores the held-out test
    /// input, and evaluates the scores against the true test labels.
    ///
    /// # Errors
    ///
    /// Returns the first error from any stage; a job failure surfaces
    /// as [`AbandonoError::JobFailed`].
    pub fn run(&self) -> Result<PipelineOutcome> {
        let raw = RawDataset::read_delimited(&self.config.data_path, ',')?;
        let prepared = prepare_churn_table(&raw)?;
        let split = train_valid_test_split(
            &prepared.features,
            &prepared.labels,
            TRAIN_FRACTION,
            VALIDATION_FRACTION,
            self.config.seed,
        )?;

        fs::create_dir_all(&self.config.work_dir)?;
        self.write_partition_files(&split)?;

        let train_spec = self.training_spec();
        self.platform.submit_training_job(&train_spec)?;
        wait_for_completion(&train_spec.job_name, self.poll_interval(), || {
            self.platform.training_job_status(&train_spec.job_name)
        })?;

        let score_spec = self.scoring_spec(&train_spec);
        self.platform.submit_scoring_job(&score_spec)?;
        wait_for_completion(&score_spec.job_name, self.poll_interval(), || {
            self.platform.scoring_job_status(&score_spec.job_name)
        })?;

        let scores = read_scores(&score_spec.output_location)?;
        if scores.len() != split.test.n_rows() {
            return Err(AbandonoError::ShapeMismatch {
                expected: format!("{} scores", split.test.n_rows()),
                actual: format!("{} scores", scores.len()),
            });
        }
        let report = EvaluationReport::from_scores(&scores, &split.test.labels)?;

        Ok(PipelineOutcome {
            report,
            scores,
            artifact_location: train_spec.artifact_location(),
        })
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    /// Writes train/validation with a leading label column, test without.
    fn write_partition_files(&self, split: &DatasetSplit) -> Result<()> {
        labeled_frame(&split.train)?
            .write_delimited(self.config.work_dir.join("train.csv"), ',')?;
        labeled_frame(&split.validation)?
            .write_delimited(self.config.work_dir.join("validation.csv"), ',')?;
        split
            .test
            .features
            .write_delimited(self.config.work_dir.join("test.csv"), ',')?;
        Ok(())
    }

    fn training_spec(&self) -> TrainingJobSpec {
        TrainingJobSpec {
            job_name: format!("{}-train", self.config.model_name),
            model_name: self.config.model_name.clone(),
            instance_type: "local".to_string(),
            instance_count: 1,
            hyperparameters: self.config.hyperparameters.clone(),
            input_location: self.config.work_dir.join("train.csv"),
            output_location: self.config.work_dir.join("artifacts"),
        }
    }

    fn scoring_spec(&self, train_spec: &TrainingJobSpec) -> BatchScoringJobSpec {
        BatchScoringJobSpec {
            job_name: format!("{}-score", self.config.model_name),
            model_location: train_spec.artifact_location(),
            input_location: self.config.work_dir.join("test.csv"),
            output_location: self.config.work_dir.join("scores").join(format!(
                "{}.out",
                self.config.model_name
            )),
            content_type: "text/csv".to_string(),
            max_concurrent_transforms: 1,
            max_payload_mb: 6,
        }
    }
}

/// Rebuilds a partition as a frame with the label in the first column,
/// the layout training input uses.
fn labeled_frame(partition: &Partition) -> Result<DataFrame> {
    let label: Vec<f32> = partition.labels.iter().map(|&l| l as f32).collect();
    let mut columns = vec![(schema::LABEL_COLUMN.to_string(), Vector::from_vec(label))];
    for (name, values) in partition.features.iter_columns() {
        columns.push((name.to_string(), values.clone()));
    }
    DataFrame::new(columns)
}
