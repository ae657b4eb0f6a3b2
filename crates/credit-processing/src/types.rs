//! Output types of the preprocessing pipeline.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PreprocessingError, Result};

/// Dense numeric features, one row per record, row-major.
///
/// Column order and width are fixed by the fitted pipeline and are exactly
/// what the classifier expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    n_rows: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Assemble a matrix from equally long feature columns.
    pub fn from_columns(feature_names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if feature_names.len() != columns.len() {
            return Err(PreprocessingError::FeatureWidthMismatch {
                expected: feature_names.len(),
                actual: columns.len(),
            });
        }

        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some((idx, _)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(PreprocessingError::InvalidConfig(format!(
                "feature '{}' has {} rows, expected {}",
                feature_names[idx],
                columns[idx].len(),
                n_rows
            )));
        }

        let n_cols = columns.len();
        let mut data = vec![0.0; n_rows * n_cols];
        for (j, column) in columns.iter().enumerate() {
            for (i, value) in column.iter().enumerate() {
                data[i * n_cols + j] = *value;
            }
        }

        Ok(Self {
            feature_names,
            n_rows,
            data,
        })
    }

    /// Build from row-major data.
    pub fn from_rows(feature_names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_cols = feature_names.len();
        if let Some(row) = rows.iter().find(|r| r.len() != n_cols) {
            return Err(PreprocessingError::FeatureWidthMismatch {
                expected: n_cols,
                actual: row.len(),
            });
        }

        Ok(Self {
            feature_names,
            n_rows: rows.len(),
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// One record's features.
    pub fn row(&self, i: usize) -> &[f64] {
        let n_cols = self.n_cols();
        &self.data[i * n_cols..(i + 1) * n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// All values of one feature.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows().map(|row| row[j]).collect()
    }

    /// Index of a feature by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Convert to a DataFrame with one Float64 column per feature.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(j, name)| Series::new(name.as_str().into(), self.column(j)).into_column())
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Result of transforming one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedBatch {
    pub features: FeatureMatrix,
    /// Label codes when the label column was present. Unknown labels are `None`.
    pub labels: Option<Vec<Option<u32>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_columns_is_row_major() {
        let matrix =
            FeatureMatrix::from_columns(names(&["a", "b"]), vec![vec![1.0, 2.0], vec![3.0, 4.0]])
                .unwrap();
        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_cols(), 2);
        assert_eq!(matrix.row(0), &[1.0, 3.0]);
        assert_eq!(matrix.row(1), &[2.0, 4.0]);
        assert_eq!(matrix.column(1), vec![3.0, 4.0]);
        assert_eq!(matrix.position("b"), Some(1));
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let result =
            FeatureMatrix::from_columns(names(&["a", "b"]), vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_rows_width_checked() {
        let result = FeatureMatrix::from_rows(names(&["a", "b"]), vec![vec![1.0]]);
        assert!(matches!(
            result,
            Err(PreprocessingError::FeatureWidthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_to_dataframe() {
        let matrix = FeatureMatrix::from_rows(names(&["x", "y"]), vec![vec![0.5, 1.0]]).unwrap();
        let df = matrix.to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 2);
        assert_eq!(
            df.column("y").unwrap().get(0).unwrap().try_extract::<f64>().unwrap(),
            1.0
        );
    }
}
