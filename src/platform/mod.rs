//! The managed-platform boundary: training and batch scoring jobs.
//!
//! The pipeline never trains or scores inline; it submits named jobs
//! through the client traits here, polls until a terminal state, and
//! fetches output artifacts by location. [`LocalPlatform`] implements
//! both traits on the local filesystem so the full workflow runs without
//! external services.
//!
//! Job contract: submit with a spec, poll [`JobStatus`] until terminal,
//! read the output artifact. Nothing else is visible across the
//! boundary.

mod local;

pub use local::LocalPlatform;

use crate::error::{AbandonoError, Result};
use crate::tree::GradientBoostedClassifier;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The only objective the boosted-tree container supports.
pub const LOGISTIC_OBJECTIVE: &str = "binary:logistic";

/// Hyperparameters crossed to the training collaborator.
///
/// Field names follow the boosted-tree container's conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingHyperparameters {
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Learning rate (shrinkage).
    pub eta: f32,
    /// Row subsample fraction per boosting round.
    pub subsample: f32,
    /// Number of boosting rounds.
    pub num_round: usize,
    /// L2 leaf regularization term.
    pub lambda: f32,
    /// Training objective; only `binary:logistic` is supported.
    pub objective: String,
}

impl Default for BoostingHyperparameters {
    fn default() -> Self {
        Self {
            max_depth: 5,
            eta: 0.2,
            subsample: 0.8,
            num_round: 100,
            lambda: 1.0,
            objective: LOGISTIC_OBJECTIVE.to_string(),
        }
    }
}

impl BoostingHyperparameters {
    /// Builds an untrained classifier configured with these values.
    ///
    /// # Errors
    ///
    /// Returns an error if the objective is not `binary:logistic`.
    /// Range checks on the numeric values happen at fit time.
    pub fn to_model(&self, seed: u64) -> Result<GradientBoostedClassifier> {
        if self.objective != LOGISTIC_OBJECTIVE {
            return Err(AbandonoError::InvalidHyperparameter {
                param: "objective".to_string(),
                value: self.objective.clone(),
                constraint: format!("must be {LOGISTIC_OBJECTIVE}"),
            });
        }
        Ok(GradientBoostedClassifier::new()
            .with_max_depth(self.max_depth)
            .with_learning_rate(self.eta)
            .with_subsample(self.subsample)
            .with_num_round(self.num_round)
            .with_l2_regularization(self.lambda)
            .with_seed(seed))
    }
}

/// A training job submission.
///
/// The input file is delimited text whose first column is the label; the
/// remaining columns are features. The model artifact is written to
/// `output_location` under `<model_name>.bin` and is immutable once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobSpec {
    /// Unique job name.
    pub job_name: String,
    /// Name under which the model artifact is registered.
    pub model_name: String,
    /// Instance type, recorded in the job record. The local platform
    /// runs in-process regardless.
    pub instance_type: String,
    /// Instance count, recorded in the job record.
    pub instance_count: usize,
    /// Hyperparameters for the boosted-tree container.
    pub hyperparameters: BoostingHyperparameters,
    /// Label-led delimited training data.
    pub input_location: PathBuf,
    /// Directory receiving the model artifact and job record.
    pub output_location: PathBuf,
}

impl TrainingJobSpec {
    /// Location of the model artifact this job produces.
    #[must_use]
    pub fn artifact_location(&self) -> PathBuf {
        self.output_location.join(format!("{}.bin", self.model_name))
    }
}

/// A batch scoring job submission.
///
/// The input file is delimited text containing features only (no label
/// column). Output is a file of newline-delimited prediction scores, one
/// per input row, in row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchScoringJobSpec {
    /// Unique job name.
    pub job_name: String,
    /// Location of the model artifact to apply.
    pub model_location: PathBuf,
    /// Label-free delimited input data.
    pub input_location: PathBuf,
    /// File receiving the newline-delimited scores.
    pub output_location: PathBuf,
    /// Input content type, recorded in the job record.
    pub content_type: String,
    /// Concurrency limit, recorded in the job record. The local platform
    /// scores in one pass.
    pub max_concurrent_transforms: usize,
    /// Payload limit in MB, recorded in the job record.
    pub max_payload_mb: usize,
}

/// The states a job exposes across the boundary.
///
/// Whatever happens inside the platform, the pipeline only ever sees
/// "in progress" or one of the two terminal states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Submitted and not yet terminal.
    InProgress,
    /// Terminal: output is available at the requested location.
    Completed,
    /// Terminal: the platform reports a failure reason.
    Failed(String),
}

impl JobStatus {
    /// Returns true for `Completed` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::InProgress)
    }
}

/// Client for the managed training service.
pub trait TrainingClient {
    /// Submits a training job; returns as soon as the job is accepted.
    fn submit_training_job(&self, spec: &TrainingJobSpec) -> Result<()>;

    /// Reports the current status of a training job.
    fn training_job_status(&self, job_name: &str) -> Result<JobStatus>;
}

/// Client for the managed batch scoring service.
pub trait BatchScoringClient {
    /// Submits a batch scoring job; returns as soon as the job is accepted.
    fn submit_scoring_job(&self, spec: &BatchScoringJobSpec) -> Result<()>;

    /// Reports the current status of a scoring job.
    fn scoring_job_status(&self, job_name: &str) -> Result<JobStatus>;
}

/// Blocks until a job reaches a terminal state (fire-and-wait).
///
/// Polls at a fixed interval. There is deliberately no timeout, retry,
/// or cancellation: the pipeline defines none.
///
/// # Errors
///
/// Returns [`AbandonoError::JobFailed`] if the terminal state is
/// `Failed`, or any error the status call itself produces.
pub fn wait_for_completion<F>(job_name: &str, poll_interval: Duration, status: F) -> Result<()>
where
    F: Fn() -> Result<JobStatus>,
{
    loop {
        match status()? {
            JobStatus::InProgress => std::thread::sleep(poll_interval),
            JobStatus::Completed => return Ok(()),
            JobStatus::Failed(reason) => {
                return Err(AbandonoError::JobFailed {
                    job: job_name.to_string(),
                    reason,
                })
            }
        }
    }
}

/// Reads a newline-delimited score file produced by a scoring job.
///
/// # Errors
///
/// Returns an error on I/O failure or an unparsable line.
pub fn read_scores<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(row, line)| {
            line.trim().parse::<f32>().map_err(|_| AbandonoError::ParseCell {
                column: "score".to_string(),
                row,
                value: line.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_default_hyperparameters_build_a_model() {
        let params = BoostingHyperparameters::default();
        assert!(params.to_model(42).is_ok());
    }

    #[test]
    fn test_unsupported_objective_rejected() {
        let params = BoostingHyperparameters {
            objective: "reg:squarederror".to_string(),
            ..BoostingHyperparameters::default()
        };
        assert!(matches!(
            params.to_model(0),
            Err(AbandonoError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_artifact_location() {
        let spec = TrainingJobSpec {
            job_name: "churn-train".to_string(),
            model_name: "churn-gbt".to_string(),
            instance_type: "local".to_string(),
            instance_count: 1,
            hyperparameters: BoostingHyperparameters::default(),
            input_location: PathBuf::from("/in/train.csv"),
            output_location: PathBuf::from("/out"),
        };
        assert_eq!(spec.artifact_location(), PathBuf::from("/out/churn-gbt.bin"));
    }

    #[test]
    fn test_status_terminality() {
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed("boom".to_string()).is_terminal());
    }

    #[test]
    fn test_wait_polls_until_completed() {
        let remaining = Cell::new(3);
        let result = wait_for_completion("job", Duration::from_millis(1), || {
            if remaining.get() == 0 {
                Ok(JobStatus::Completed)
            } else {
                remaining.set(remaining.get() - 1);
                Ok(JobStatus::InProgress)
            }
        });
        assert!(result.is_ok());
        assert_eq!(remaining.get(), 0);
    }

    #[test]
    fn test_wait_surfaces_failure_reason() {
        let result = wait_for_completion("job", Duration::from_millis(1), || {
            Ok(JobStatus::Failed("bad input".to_string()))
        });
        match result {
            Err(AbandonoError::JobFailed { job, reason }) => {
                assert_eq!(job, "job");
                assert_eq!(reason, "bad input");
            }
            other => panic!("expected JobFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_read_scores() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.txt");
        fs::write(&path, "0.91\n0.02\n0.55\n").expect("write");
        let scores = read_scores(&path).expect("parse");
        assert_eq!(scores, vec![0.91, 0.02, 0.55]);
    }

    #[test]
    fn test_read_scores_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.txt");
        fs::write(&path, "0.91\nnot-a-number\n").expect("write");
        assert!(matches!(
            read_scores(&path),
            Err(AbandonoError::ParseCell { row: 1, .. })
        ));
    }
}
