//! Tabular containers for the churn dataset.
//!
//! Two layers: [`RawDataset`] holds the delimited source table as strings
//! (the form in which cleaning and encoding decisions are made), and
//! [`DataFrame`] holds named numeric columns ready for splitting and
//! training.

mod frame;
mod raw;
pub mod schema;

pub use frame::DataFrame;
pub use raw::RawDataset;
