//! String-celled table read from a delimited text file.

use crate::error::{AbandonoError, Result};
use std::fs;
use std::path::Path;

/// A delimited table held as strings, one `Vec<String>` per row.
///
/// This is the form the cleaner and encoder operate on; numeric parsing
/// happens only when columns are converted to a
/// [`DataFrame`](crate::data::DataFrame).
///
/// # Examples
///
/// ```
/// use abandono::data::RawDataset;
///
/// let ds = RawDataset::from_rows(
///     vec!["id".to_string(), "plan".to_string()],
///     vec![
///         vec!["a1".to_string(), "basic".to_string()],
///         vec!["a2".to_string(), "pro".to_string()],
///     ],
/// ).expect("consistent row widths");
/// assert_eq!(ds.n_rows(), 2);
/// assert_eq!(ds.column_values("plan").expect("column exists"), &["basic", "pro"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDataset {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawDataset {
    /// Builds a dataset from a header and rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is empty or any row width differs
    /// from the header width.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if header.is_empty() {
            return Err("Header must have at least one column".into());
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(AbandonoError::ShapeMismatch {
                    expected: format!("{} fields per row", header.len()),
                    actual: format!("{} fields in row {i}", row.len()),
                });
            }
        }
        Ok(Self { header, rows })
    }

    /// Reads a delimited text file with a header line.
    ///
    /// Fields are split on `delimiter`; no quoting rules are applied,
    /// matching the source table's conventions.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, an empty file, or ragged rows.
    pub fn read_delimited<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut lines = content.lines();

        let header_line = lines.next().ok_or("Input file is empty")?;
        let header: Vec<String> = header_line
            .split(delimiter)
            .map(|f| f.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            rows.push(line.split(delimiter).map(ToString::to_string).collect());
        }

        Self::from_rows(header, rows)
    }

    /// Writes the table as delimited text with a header line.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    pub fn write_delimited<P: AsRef<Path>>(&self, path: P, delimiter: char) -> Result<()> {
        let mut out = String::new();
        out.push_str(&self.header.join(&delimiter.to_string()));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(&delimiter.to_string()));
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }

    /// Returns the number of data rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.header.len()
    }

    /// Returns the column names in file order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.header.iter().map(String::as_str).collect()
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the position of a column by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| format!("Column '{name}' not found").into())
    }

    /// Returns all cell values of a column, in row order.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist.
    pub fn column_values(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Removes a column by name, returning a new dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist or is the last one.
    pub fn drop_column(&self, name: &str) -> Result<Self> {
        if self.header.len() == 1 {
            return Err("Cannot drop the last column".into());
        }
        let idx = self.column_index(name)?;

        let header = self
            .header
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != idx)
            .map(|(_, h)| h.clone())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(i, _)| i != idx)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .collect();

        Self::from_rows(header, rows)
    }

    /// Verifies the header matches an expected layout exactly.
    ///
    /// # Errors
    ///
    /// Returns [`AbandonoError::SchemaMismatch`] on any difference.
    pub fn check_schema(&self, expected: &[&str]) -> Result<()> {
        let actual = self.column_names();
        if actual != expected {
            return Err(AbandonoError::SchemaMismatch {
                expected: expected.join(","),
                actual: actual.join(","),
            });
        }
        Ok(())
    }

    /// Parses a column as `f32` values.
    ///
    /// # Errors
    ///
    /// Returns [`AbandonoError::ParseCell`] naming the first offending
    /// cell. Cells that are blank after trimming are rejected too.
    pub fn parse_numeric_column(&self, name: &str) -> Result<Vec<f32>> {
        let idx = self.column_index(name)?;
        let mut values = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let cell = row[idx].trim();
            let parsed = cell.parse::<f32>().map_err(|_| AbandonoError::ParseCell {
                column: name.to_string(),
                row: row_idx,
                value: row[idx].clone(),
            })?;
            values.push(parsed);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawDataset {
        RawDataset::from_rows(
            vec!["id".into(), "plan".into(), "tenure".into()],
            vec![
                vec!["a".into(), "basic".into(), "1".into()],
                vec!["b".into(), "pro".into(), "24".into()],
                vec!["c".into(), "basic".into(), "7".into()],
            ],
        )
        .expect("valid table")
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let result = RawDataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()]],
        );
        assert!(matches!(
            result,
            Err(AbandonoError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_column_values() {
        let ds = sample();
        assert_eq!(
            ds.column_values("plan").expect("column exists"),
            vec!["basic", "pro", "basic"]
        );
    }

    #[test]
    fn test_drop_column() {
        let ds = sample().drop_column("id").expect("droppable");
        assert_eq!(ds.column_names(), vec!["plan", "tenure"]);
        assert_eq!(ds.n_rows(), 3);
        assert!(ds.column_index("id").is_err());
    }

    #[test]
    fn test_check_schema_mismatch() {
        let ds = sample();
        assert!(ds.check_schema(&["id", "plan", "tenure"]).is_ok());
        let err = ds.check_schema(&["id", "tenure", "plan"]).unwrap_err();
        assert!(matches!(err, AbandonoError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_parse_numeric_column() {
        let ds = sample();
        let tenure = ds.parse_numeric_column("tenure").expect("numeric");
        assert_eq!(tenure, vec![1.0, 24.0, 7.0]);
    }

    #[test]
    fn test_parse_numeric_column_bad_cell() {
        let ds = RawDataset::from_rows(
            vec!["x".into()],
            vec![vec!["1.5".into()], vec![" ".into()]],
        )
        .expect("valid table");
        let err = ds.parse_numeric_column("x").unwrap_err();
        match err {
            AbandonoError::ParseCell { column, row, .. } => {
                assert_eq!(column, "x");
                assert_eq!(row, 1);
            }
            other => panic!("expected ParseCell, got {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_delimited() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("table.csv");
        let ds = sample();
        ds.write_delimited(&path, ',').expect("write");
        let back = RawDataset::read_delimited(&path, ',').expect("read");
        assert_eq!(back, ds);
    }
}
