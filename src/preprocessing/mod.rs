//! Cleaning and encoding of the raw churn table.
//!
//! The steps mirror the preparation applied to the source data: drop the
//! customer identifier, remove exact duplicate rows, one-hot encode the
//! categorical fields, pass numeric fields through, and drop the fixed
//! set of linearly redundant numeric columns.
//!
//! # Example
//!
//! ```
//! use abandono::data::RawDataset;
//! use abandono::preprocessing::dedup_rows;
//!
//! let ds = RawDataset::from_rows(
//!     vec!["plan".to_string()],
//!     vec![
//!         vec!["basic".to_string()],
//!         vec!["basic".to_string()],
//!         vec!["pro".to_string()],
//!     ],
//! ).expect("valid table");
//! let deduped = dedup_rows(&ds);
//! assert_eq!(deduped.n_rows(), 2);
//! ```

use crate::data::{schema, DataFrame, RawDataset};
use crate::error::{AbandonoError, Result};
use crate::primitives::Vector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Removes exact duplicate rows, keeping the first occurrence of each.
///
/// Order-preserving, and idempotent: a second pass removes nothing.
#[must_use]
pub fn dedup_rows(ds: &RawDataset) -> RawDataset {
    let mut seen: HashSet<&[String]> = HashSet::with_capacity(ds.n_rows());
    let mut kept = Vec::new();
    for row in ds.rows() {
        if seen.insert(row.as_slice()) {
            kept.push(row.clone());
        }
    }
    let header = ds
        .column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    RawDataset::from_rows(header, kept).expect("Deduplicated rows keep the original width")
}

/// Encodes the binary churn label: "Yes" → 1, "No" → 0.
///
/// # Errors
///
/// Returns an error on any other value.
pub fn encode_label(values: &[&str]) -> Result<Vec<usize>> {
    values
        .iter()
        .enumerate()
        .map(|(row, &v)| match v.trim() {
            "Yes" => Ok(1),
            "No" => Ok(0),
            other => Err(AbandonoError::ParseCell {
                column: schema::LABEL_COLUMN.to_string(),
                row,
                value: other.to_string(),
            }),
        })
        .collect()
}

/// One-hot encoder for categorical string columns.
///
/// `fit` learns the sorted category vocabulary of each configured column;
/// `transform` emits one 0/1 column per (column, category) pair, named
/// `column_category`. Per source column, the output columns are mutually
/// exclusive and sum to 1 on every row.
///
/// # Example
///
/// ```
/// use abandono::data::RawDataset;
/// use abandono::preprocessing::OneHotEncoder;
///
/// let ds = RawDataset::from_rows(
///     vec!["Contract".to_string()],
///     vec![
///         vec!["Month-to-month".to_string()],
///         vec!["Two year".to_string()],
///     ],
/// ).expect("valid table");
///
/// let mut encoder = OneHotEncoder::new(vec!["Contract".to_string()]);
/// let encoded = encoder.fit_transform(&ds).expect("fit_transform should succeed");
/// assert_eq!(encoded.n_cols(), 2);
/// assert_eq!(encoded.column("Contract_Two year").expect("exists").as_slice(), &[0.0, 1.0]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Columns to encode, in output order.
    columns: Vec<String>,
    /// Sorted category vocabulary per column (learned during fit).
    categories: Option<Vec<Vec<String>>>,
}

impl OneHotEncoder {
    /// Creates an encoder for the given categorical columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            categories: None,
        }
    }

    /// Returns true if the encoder has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.categories.is_some()
    }

    /// Learns the category vocabulary of each configured column.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured column is missing from the data.
    pub fn fit(&mut self, ds: &RawDataset) -> Result<()> {
        let mut categories = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let values = ds.column_values(column)?;
            let mut unique: Vec<String> = values
                .iter()
                .map(|v| v.trim().to_string())
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            unique.sort_unstable();
            categories.push(unique);
        }
        self.categories = Some(categories);
        Ok(())
    }

    /// Encodes the configured columns as 0/1 indicator columns.
    ///
    /// # Errors
    ///
    /// Returns an error if unfitted, a column is missing, or a value was
    /// not seen during fit.
    pub fn transform(&self, ds: &RawDataset) -> Result<DataFrame> {
        let categories = self.categories.as_ref().ok_or(AbandonoError::NotFitted {
            component: "OneHotEncoder".to_string(),
        })?;

        let mut out_columns = Vec::new();
        for (column, vocab) in self.columns.iter().zip(categories) {
            let values = ds.column_values(column)?;
            let mut indicators = vec![vec![0.0f32; values.len()]; vocab.len()];
            for (row, value) in values.iter().enumerate() {
                let trimmed = value.trim();
                let slot = vocab.iter().position(|c| c == trimmed).ok_or_else(|| {
                    AbandonoError::UnknownCategory {
                        column: column.clone(),
                        value: trimmed.to_string(),
                    }
                })?;
                indicators[slot][row] = 1.0;
            }
            for (category, data) in vocab.iter().zip(indicators) {
                out_columns.push((format!("{column}_{category}"), Vector::from_vec(data)));
            }
        }
        DataFrame::new(out_columns)
    }

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting or transforming fails.
    pub fn fit_transform(&mut self, ds: &RawDataset) -> Result<DataFrame> {
        self.fit(ds)?;
        self.transform(ds)
    }
}

/// A cleaned, encoded churn table ready for splitting.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    /// Numeric feature columns (one-hot indicators plus retained numerics).
    pub features: DataFrame,
    /// Binary churn labels aligned with the feature rows.
    pub labels: Vec<usize>,
    /// The fitted encoder, kept for scoring-time consistency checks.
    pub encoder: OneHotEncoder,
}

/// Runs the full preparation sequence on a raw churn table.
///
/// Steps, in order: schema check, customer-id drop, exact deduplication,
/// label encoding, one-hot encoding of categorical fields, numeric
/// passthrough, and the fixed redundant-column drop.
///
/// # Errors
///
/// Returns an error on schema mismatch, unparsable cells, or label values
/// outside Yes/No.
pub fn prepare_churn_table(raw: &RawDataset) -> Result<PreparedTable> {
    raw.check_schema(&schema::COLUMNS)?;

    let table = raw.drop_column(schema::ID_COLUMN)?;
    let table = dedup_rows(&table);

    let labels = encode_label(&table.column_values(schema::LABEL_COLUMN)?)?;
    let table = table.drop_column(schema::LABEL_COLUMN)?;

    let categorical: Vec<String> = table
        .column_names()
        .iter()
        .filter(|name| !schema::is_numeric(name))
        .map(ToString::to_string)
        .collect();

    let mut encoder = OneHotEncoder::new(categorical);
    let mut features = encoder.fit_transform(&table)?;

    for name in table.column_names() {
        if schema::is_numeric(name) && !schema::REDUNDANT_COLUMNS.contains(&name) {
            let values = table.parse_numeric_column(name)?;
            features.add_column(name.to_string(), Vector::from_vec(values))?;
        }
    }

    Ok(PreparedTable {
        features,
        labels,
        encoder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema;

    /// Builds a minimal but schema-complete churn table.
    fn churn_table(rows: Vec<Vec<String>>) -> RawDataset {
        RawDataset::from_rows(
            schema::COLUMNS.iter().map(ToString::to_string).collect(),
            rows,
        )
        .expect("valid table")
    }

    fn sample_row(id: &str, tenure: &str, churn: &str) -> Vec<String> {
        [
            id, "Female", "0", "Yes", "No", tenure, "Yes", "No", "DSL", "Yes", "No", "No", "Yes",
            "No", "No", "Month-to-month", "Yes", "Electronic check", "29.85", "29.85", churn,
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let ds = RawDataset::from_rows(
            vec!["x".into()],
            vec![
                vec!["a".into()],
                vec!["b".into()],
                vec!["a".into()],
                vec!["c".into()],
            ],
        )
        .expect("valid table");
        let deduped = dedup_rows(&ds);
        let values = deduped.column_values("x").expect("column exists");
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let ds = RawDataset::from_rows(
            vec!["x".into()],
            vec![vec!["a".into()], vec!["a".into()], vec!["b".into()]],
        )
        .expect("valid table");
        let once = dedup_rows(&ds);
        let twice = dedup_rows(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_encode_label() {
        let labels = encode_label(&["Yes", "No", "No"]).expect("valid labels");
        assert_eq!(labels, vec![1, 0, 0]);
    }

    #[test]
    fn test_encode_label_rejects_other_values() {
        let err = encode_label(&["Yes", "Maybe"]).unwrap_err();
        assert!(matches!(err, AbandonoError::ParseCell { row: 1, .. }));
    }

    #[test]
    fn test_one_hot_columns_are_exclusive() {
        let ds = RawDataset::from_rows(
            vec!["Contract".into()],
            vec![
                vec!["Month-to-month".into()],
                vec!["One year".into()],
                vec!["Two year".into()],
                vec!["One year".into()],
            ],
        )
        .expect("valid table");
        let mut encoder = OneHotEncoder::new(vec!["Contract".into()]);
        let encoded = encoder.fit_transform(&ds).expect("encode");

        assert_eq!(encoded.n_cols(), 3);
        for row in 0..encoded.n_rows() {
            let sum: f32 = encoded.iter_columns().map(|(_, col)| col[row]).sum();
            assert!((sum - 1.0).abs() < f32::EPSILON, "row {row} sums to {sum}");
        }
    }

    #[test]
    fn test_one_hot_unknown_category() {
        let fit_ds = RawDataset::from_rows(vec!["plan".into()], vec![vec!["basic".into()]])
            .expect("valid table");
        let new_ds = RawDataset::from_rows(vec!["plan".into()], vec![vec!["pro".into()]])
            .expect("valid table");

        let mut encoder = OneHotEncoder::new(vec!["plan".into()]);
        encoder.fit(&fit_ds).expect("fit");
        let err = encoder.transform(&new_ds).unwrap_err();
        assert!(matches!(err, AbandonoError::UnknownCategory { .. }));
    }

    #[test]
    fn test_one_hot_unfitted() {
        let ds = RawDataset::from_rows(vec!["plan".into()], vec![vec!["basic".into()]])
            .expect("valid table");
        let encoder = OneHotEncoder::new(vec!["plan".into()]);
        let err = encoder.transform(&ds).unwrap_err();
        assert!(matches!(err, AbandonoError::NotFitted { .. }));
    }

    #[test]
    fn test_prepare_drops_id_label_and_redundant_columns() {
        let table = churn_table(vec![
            sample_row("0001", "1", "No"),
            sample_row("0002", "34", "Yes"),
        ]);
        let prepared = prepare_churn_table(&table).expect("prepare");

        let names = prepared.features.column_names();
        assert!(!names.iter().any(|n| n.starts_with("customerID")));
        assert!(!names.iter().any(|n| n.starts_with("Churn")));
        assert!(!names.contains(&"TotalCharges"));
        assert!(names.contains(&"tenure"));
        assert!(names.contains(&"MonthlyCharges"));
        assert_eq!(prepared.labels, vec![0, 1]);
    }

    #[test]
    fn test_prepare_deduplicates() {
        let table = churn_table(vec![
            sample_row("0001", "1", "No"),
            sample_row("0001", "1", "No"),
            sample_row("0002", "34", "Yes"),
        ]);
        let prepared = prepare_churn_table(&table).expect("prepare");
        assert_eq!(prepared.features.n_rows(), 2);
        assert_eq!(prepared.labels.len(), 2);
    }

    #[test]
    fn test_prepare_rejects_wrong_schema() {
        let ds = RawDataset::from_rows(vec!["a".into()], vec![vec!["1".into()]])
            .expect("valid table");
        let err = prepare_churn_table(&ds).unwrap_err();
        assert!(matches!(err, AbandonoError::SchemaMismatch { .. }));
    }
}
