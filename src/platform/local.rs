//! Filesystem-backed implementation of the platform boundary.

use super::{
    BatchScoringClient, BatchScoringJobSpec, JobStatus, TrainingClient, TrainingJobSpec,
};
use crate::data::DataFrame;
use crate::error::{AbandonoError, Result};
use crate::tree::GradientBoostedClassifier;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

/// A local stand-in for the managed platform.
///
/// Jobs run on worker threads against the local filesystem; the
/// submitting side observes them only through [`JobStatus`], so the
/// fire-and-wait contract is identical to the managed service's.
///
/// Locations in job specs are ordinary paths. Model artifacts are
/// created once and never overwritten; submitting a training job for an
/// existing artifact fails the job.
#[derive(Debug, Clone)]
pub struct LocalPlatform {
    jobs: Arc<Mutex<HashMap<String, JobStatus>>>,
    /// Seed handed to the booster for reproducible subsampling.
    seed: u64,
}

impl LocalPlatform {
    /// Creates a platform with the given training seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            seed,
        }
    }

    fn register_job(&self, job_name: &str) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job table lock poisoned");
        if jobs.contains_key(job_name) {
            return Err(format!("Job name '{job_name}' already in use").into());
        }
        jobs.insert(job_name.to_string(), JobStatus::InProgress);
        Ok(())
    }

    fn finish_job(jobs: &Arc<Mutex<HashMap<String, JobStatus>>>, job_name: &str, result: Result<()>) {
        let status = match result {
            Ok(()) => JobStatus::Completed,
            Err(e) => JobStatus::Failed(e.to_string()),
        };
        jobs.lock()
            .expect("job table lock poisoned")
            .insert(job_name.to_string(), status);
    }

    fn job_status(&self, job_name: &str) -> Result<JobStatus> {
        self.jobs
            .lock()
            .expect("job table lock poisoned")
            .get(job_name)
            .cloned()
            .ok_or_else(|| format!("Unknown job '{job_name}'").into())
    }
}

impl TrainingClient for LocalPlatform {
    fn submit_training_job(&self, spec: &TrainingJobSpec) -> Result<()> {
        if spec.instance_count == 0 {
            return Err(AbandonoError::InvalidHyperparameter {
                param: "instance_count".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        self.register_job(&spec.job_name)?;

        let jobs = Arc::clone(&self.jobs);
        let spec = spec.clone();
        let seed = self.seed;
        thread::spawn(move || {
            // A panicking worker must still land the job in a terminal
            // state, or pollers would wait forever.
            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| run_training(&spec, seed)))
                .unwrap_or_else(|_| Err("Training worker panicked".into()));
            Self::finish_job(&jobs, &spec.job_name, result);
        });
        Ok(())
    }

    fn training_job_status(&self, job_name: &str) -> Result<JobStatus> {
        self.job_status(job_name)
    }
}

impl BatchScoringClient for LocalPlatform {
    fn submit_scoring_job(&self, spec: &BatchScoringJobSpec) -> Result<()> {
        if spec.max_concurrent_transforms == 0 {
            return Err(AbandonoError::InvalidHyperparameter {
                param: "max_concurrent_transforms".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        self.register_job(&spec.job_name)?;

        let jobs = Arc::clone(&self.jobs);
        let spec = spec.clone();
        thread::spawn(move || {
            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| run_scoring(&spec)))
                .unwrap_or_else(|_| Err("Scoring worker panicked".into()));
            Self::finish_job(&jobs, &spec.job_name, result);
        });
        Ok(())
    }

    fn scoring_job_status(&self, job_name: &str) -> Result<JobStatus> {
        self.job_status(job_name)
    }
}

/// Executes a training job: label-led input in, immutable artifact out.
fn run_training(spec: &TrainingJobSpec, seed: u64) -> Result<()> {
    let artifact = spec.artifact_location();
    fs::create_dir_all(&spec.output_location)?;
    claim_artifact(&artifact, &spec.model_name)?;

    let result = train_model(spec, seed).and_then(|model| {
        model.save(&artifact)?;
        let record = serde_json::to_string_pretty(spec)?;
        fs::write(
            spec.output_location.join(format!("{}.json", spec.job_name)),
            record,
        )?;
        Ok(())
    });
    if result.is_err() {
        // A failed job must not leave an artifact behind.
        let _ = fs::remove_file(&artifact);
    }
    result
}

/// Claims the artifact name for this job. `create_new` is the atomicity
/// point: of two racing trainers, exactly one gets the name and the
/// other fails with a typed error.
fn claim_artifact(path: &Path, model_name: &str) -> Result<()> {
    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(AbandonoError::ArtifactExists {
                name: model_name.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn train_model(spec: &TrainingJobSpec, seed: u64) -> Result<GradientBoostedClassifier> {
    let table = DataFrame::read_delimited(&spec.input_location, ',')?;
    let label_column = table.column_names()[0].to_string();
    let labels = binary_labels(&table, &label_column)?;
    let features = table.drop_column(&label_column)?;

    let mut model = spec.hyperparameters.to_model(seed)?;
    model.fit(&features.to_matrix(), &labels)?;
    Ok(model)
}

/// Executes a scoring job: label-free input in, one score line per row out.
fn run_scoring(spec: &BatchScoringJobSpec) -> Result<()> {
    let model = GradientBoostedClassifier::load(&spec.model_location)?;
    let table = DataFrame::read_delimited(&spec.input_location, ',')?;
    let scores = model.predict_proba(&table.to_matrix())?;

    if let Some(parent) = spec.output_location.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = String::with_capacity(scores.len() * 12);
    for score in &scores {
        out.push_str(&format!("{score}\n"));
    }
    fs::write(&spec.output_location, out)?;

    let record = serde_json::to_string_pretty(spec)?;
    fs::write(spec.output_location.with_extension("json"), record)?;
    Ok(())
}

/// Reads the first column as strict 0/1 labels.
fn binary_labels(table: &DataFrame, column: &str) -> Result<Vec<usize>> {
    table
        .column(column)?
        .iter()
        .enumerate()
        .map(|(row, &v)| {
            if v == 0.0 {
                Ok(0)
            } else if v == 1.0 {
                Ok(1)
            } else {
                Err(AbandonoError::ParseCell {
                    column: column.to_string(),
                    row,
                    value: v.to_string(),
                })
            }
        })
        .collect()
}
