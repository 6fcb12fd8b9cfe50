//! Abandono: customer churn prediction with gradient-boosted trees in pure Rust.
//!
//! Abandono covers the full churn workflow: loading and cleaning the raw
//! subscription table, one-hot encoding, a seeded 70/20/10 split,
//! gradient-boosted training submitted as an asynchronous platform job,
//! batch scoring of the held-out rows, and binary classification metrics.
//!
//! # Quick Start
//!
//! ```no_run
//! use abandono::prelude::*;
//!
//! let config = PipelineConfig {
//!     data_path: "churn.csv".into(),
//!     work_dir: "work".into(),
//!     ..PipelineConfig::default()
//! };
//! let pipeline = ChurnPipeline::new(config, LocalPlatform::new(42));
//! let outcome = pipeline.run().unwrap();
//! println!("{}", outcome.report);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`data`]: Raw string tables and numeric DataFrames, plus the churn schema
//! - [`preprocessing`]: Deduplication, label encoding, one-hot encoding
//! - [`model_selection`]: Seeded train/validation/test splitting
//! - [`tree`]: Regression trees and the gradient-boosted classifier
//! - [`platform`]: Job specifications, client traits, and the local backend
//! - [`metrics`]: Confusion counts and the evaluation report
//! - [`pipeline`]: End-to-end workflow orchestration

pub mod data;
pub mod error;
pub mod metrics;
pub mod model_selection;
pub mod pipeline;
pub mod platform;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod tree;
