//! Loader for delimited reference tables.
//!
//! A reference table is one rectangular numeric table per file with a header
//! row naming the columns, e.g. fitted values exported from another package.

use csv::{ReaderBuilder, StringRecord};
use faer::{Col, Mat};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a reference table.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to open reference table '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed reference table: {0}")]
    Csv(#[from] csv::Error),

    #[error("reference table has no header row")]
    MissingHeader,

    #[error("reference table has no data rows")]
    Empty,

    #[error("row {row} has {got} fields, expected {expected}")]
    RowWidth {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("value '{value}' in row {row}, column '{column}' is not a number")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("reference table has no column '{0}'")]
    MissingColumn(String),
}

/// A numeric table with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    headers: Vec<String>,
    /// Column-major values.
    columns: Vec<Vec<f64>>,
}

impl ReferenceTable {
    /// Load a comma separated table from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|source| ReferenceError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv_reader(reader)
    }

    /// Parse a comma separated table from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, ReferenceError> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(ReferenceError::MissingHeader);
        }

        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
        let mut record = StringRecord::new();
        let mut row = 0;
        while reader.read_record(&mut record)? {
            row += 1;
            if record.len() != headers.len() {
                return Err(ReferenceError::RowWidth {
                    row,
                    got: record.len(),
                    expected: headers.len(),
                });
            }
            for (j, field) in record.iter().enumerate() {
                let raw = field.trim();
                let value = raw.parse::<f64>().map_err(|_| ReferenceError::Parse {
                    row,
                    column: headers[j].clone(),
                    value: raw.to_string(),
                })?;
                columns[j].push(value);
            }
        }

        if row == 0 {
            return Err(ReferenceError::Empty);
        }
        Ok(Self { headers, columns })
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    /// Values of the named column.
    pub fn column(&self, name: &str) -> Result<Col<f64>, ReferenceError> {
        let j = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReferenceError::MissingColumn(name.to_string()))?;
        let values = &self.columns[j];
        Ok(Col::from_fn(values.len(), |i| values[i]))
    }

    /// The whole table as a matrix.
    pub fn to_mat(&self) -> Mat<f64> {
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| self.columns[j][i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let text = "year,value\n1923,1.5\n1924, 2.5\n";
        let table = ReferenceTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["year".to_string(), "value".to_string()]);
        assert_eq!(table.nrows(), 2);
        let v = table.column("value").unwrap();
        assert_eq!(v[1], 2.5);
        assert_eq!(table.to_mat()[(1, 0)], 1924.0);
    }

    #[test]
    fn test_missing_column() {
        let table = ReferenceTable::from_reader("a\n1\n".as_bytes()).unwrap();
        assert!(matches!(
            table.column("b"),
            Err(ReferenceError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_non_numeric_value() {
        let err = ReferenceTable::from_reader("a,b\n1,x\n".as_bytes()).unwrap_err();
        match err {
            ReferenceError::Parse { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "b");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_ragged_row() {
        let err = ReferenceTable::from_reader("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ReferenceError::RowWidth { row: 2, .. }));
    }

    #[test]
    fn test_empty_table() {
        let err = ReferenceTable::from_reader("a,b\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ReferenceError::Empty));
    }

    #[test]
    fn test_missing_file() {
        let err = ReferenceTable::load("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, ReferenceError::Open { .. }));
    }
}
