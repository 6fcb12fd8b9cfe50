//! Numeric table with named columns.

use crate::error::{AbandonoError, Result};
use crate::primitives::{Matrix, Vector};
use std::fs;
use std::path::Path;

/// A numeric table: named `Vector<f32>` columns of equal length.
///
/// Produced by the encoder, consumed by the splitter and the learners.
///
/// # Examples
///
/// ```
/// use abandono::data::DataFrame;
/// use abandono::primitives::Vector;
///
/// let df = DataFrame::new(vec![
///     ("tenure".to_string(), Vector::from_slice(&[1.0, 24.0])),
///     ("MonthlyCharges".to_string(), Vector::from_slice(&[29.85, 56.95])),
/// ]).expect("columns of equal length");
/// assert_eq!(df.shape(), (2, 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<(String, Vector<f32>)>,
    n_rows: usize,
}

impl DataFrame {
    /// Creates a new `DataFrame` from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if columns are empty, lengths differ, a name is
    /// empty, or names repeat.
    pub fn new(columns: Vec<(String, Vector<f32>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err("DataFrame must have at least one column".into());
        }

        let n_rows = columns[0].1.len();
        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err(AbandonoError::ShapeMismatch {
                    expected: format!("{n_rows} rows"),
                    actual: format!("{} rows in column '{name}'", col.len()),
                });
            }
            if name.is_empty() {
                return Err("Column names cannot be empty".into());
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        for i in 1..names.len() {
            if names[i] == names[i - 1] {
                return Err(format!("Duplicate column name '{}'", names[i]).into());
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Returns a reference to a column by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&Vector<f32>> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| format!("Column '{name}' not found").into())
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the length doesn't match or the name exists.
    pub fn add_column(&mut self, name: String, data: Vector<f32>) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(AbandonoError::ShapeMismatch {
                expected: format!("{} rows", self.n_rows),
                actual: format!("{} rows", data.len()),
            });
        }
        if name.is_empty() {
            return Err("Column name cannot be empty".into());
        }
        if self.columns.iter().any(|(n, _)| n == &name) {
            return Err(format!("Column name '{name}' already exists").into());
        }
        self.columns.push((name, data));
        Ok(())
    }

    /// Drops a column by name, returning a new frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist or is the last one.
    pub fn drop_column(&self, name: &str) -> Result<Self> {
        if self.columns.len() == 1 {
            return Err("Cannot drop the last column".into());
        }
        if !self.columns.iter().any(|(n, _)| n == name) {
            return Err(format!("Column '{name}' not found").into());
        }
        let columns = self
            .columns
            .iter()
            .filter(|(n, _)| n != name)
            .cloned()
            .collect();
        Self::new(columns)
    }

    /// Builds a new frame containing only the given rows, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(format!("Row index {bad} out of bounds ({} rows)", self.n_rows).into());
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| {
                let data: Vec<f32> = indices.iter().map(|&i| col[i]).collect();
                (name.clone(), Vector::from_vec(data))
            })
            .collect();
        Self::new(columns)
    }

    /// Converts the frame to a row-major feature matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Matrix<f32> {
        let mut data = Vec::with_capacity(self.n_rows * self.columns.len());
        for row_idx in 0..self.n_rows {
            for (_, col) in &self.columns {
                data.push(col[row_idx]);
            }
        }
        Matrix::from_vec(self.n_rows, self.columns.len(), data)
            .expect("Internal error: data size mismatch")
    }

    /// Returns an iterator over columns as (name, vector) pairs.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Vector<f32>)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Writes the frame as delimited text with a header line.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    pub fn write_delimited<P: AsRef<Path>>(&self, path: P, delimiter: char) -> Result<()> {
        let mut out = String::new();
        let names: Vec<&str> = self.column_names();
        out.push_str(&names.join(&delimiter.to_string()));
        out.push('\n');
        for row_idx in 0..self.n_rows {
            for (col_idx, (_, col)) in self.columns.iter().enumerate() {
                if col_idx > 0 {
                    out.push(delimiter);
                }
                out.push_str(&format_cell(col[row_idx]));
            }
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }

    /// Reads a delimited numeric table with a header line.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, ragged rows, or unparsable cells.
    pub fn read_delimited<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Self> {
        let raw = crate::data::RawDataset::read_delimited(path, delimiter)?;
        let mut columns = Vec::with_capacity(raw.n_cols());
        for name in raw.column_names() {
            let values = raw.parse_numeric_column(name)?;
            columns.push((name.to_string(), Vector::from_vec(values)));
        }
        Self::new(columns)
    }
}

/// Formats a cell without trailing float noise on integral values.
fn format_cell(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            ("a".to_string(), Vector::from_slice(&[1.0, 2.0, 3.0])),
            ("b".to_string(), Vector::from_slice(&[4.5, 5.5, 6.5])),
        ])
        .expect("valid frame")
    }

    #[test]
    fn test_new_rejects_mismatched_lengths() {
        let result = DataFrame::new(vec![
            ("a".to_string(), Vector::from_slice(&[1.0])),
            ("b".to_string(), Vector::from_slice(&[1.0, 2.0])),
        ]);
        assert!(matches!(result, Err(AbandonoError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = DataFrame::new(vec![
            ("a".to_string(), Vector::from_slice(&[1.0])),
            ("a".to_string(), Vector::from_slice(&[2.0])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_matrix_row_major() {
        let m = sample().to_matrix();
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.get(1, 0), 2.0);
        assert_eq!(m.get(1, 1), 5.5);
    }

    #[test]
    fn test_select_rows() {
        let sub = sample().select_rows(&[2, 0]).expect("valid indices");
        assert_eq!(sub.n_rows(), 2);
        assert_eq!(sub.column("a").expect("exists").as_slice(), &[3.0, 1.0]);
    }

    #[test]
    fn test_select_rows_out_of_bounds() {
        assert!(sample().select_rows(&[5]).is_err());
    }

    #[test]
    fn test_drop_column() {
        let df = sample().drop_column("a").expect("droppable");
        assert_eq!(df.column_names(), vec!["b"]);
    }

    #[test]
    fn test_roundtrip_delimited() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.csv");
        let df = sample();
        df.write_delimited(&path, ',').expect("write");
        let back = DataFrame::read_delimited(&path, ',').expect("read");
        assert_eq!(back.shape(), df.shape());
        assert_eq!(back.column_names(), df.column_names());
        assert_eq!(
            back.column("b").expect("exists").as_slice(),
            df.column("b").expect("exists").as_slice()
        );
    }
}
