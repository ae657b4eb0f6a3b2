//! Column cleaning for numeric-looking text columns.
//!
//! This module provides functionality for:
//! - Stripping separator artifacts (`"1_200"`) and coercing to `f64`
//! - Extracting the leading number of duration-like text (`"22 Years and 1 Months"`)
//!
//! Cells that fail to parse become null; they are never an error. The numeric
//! imputer downstream fills them.

mod converters;

pub(crate) use converters::{extract_leading_number, parse_separated_number};

use crate::config::PipelineConfig;
use crate::utils::{is_numeric_dtype, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Converts raw columns into numeric buffers.
#[derive(Debug, Clone, Copy)]
pub struct ColumnCleaner {
    separator: char,
    max_len: usize,
}

impl Default for ColumnCleaner {
    fn default() -> Self {
        Self {
            separator: '_',
            max_len: 20,
        }
    }
}

impl ColumnCleaner {
    /// Create a cleaner with an explicit separator and truncation length.
    pub fn new(separator: char, max_len: usize) -> Self {
        Self { separator, max_len }
    }

    /// Create a cleaner from the pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.separator, config.max_numeric_len)
    }

    /// Clean a single text cell.
    pub fn clean_value(&self, value: &str) -> Option<f64> {
        parse_separated_number(value, self.separator, self.max_len)
    }

    /// Clean a whole column. Numeric columns pass through unchanged.
    pub fn clean_series(&self, series: &Series) -> PolarsResult<Vec<Option<f64>>> {
        if is_numeric_dtype(series.dtype()) || matches!(series.dtype(), DataType::Null) {
            return numeric_values(series);
        }

        let text = series.cast(&DataType::String)?;
        let cleaned: Vec<Option<f64>> = text
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| self.clean_value(s)))
            .collect();

        let lost = cleaned
            .iter()
            .zip(text.str()?.into_iter())
            .filter(|(c, raw)| c.is_none() && raw.is_some())
            .count();
        if lost > 0 {
            debug!(
                "Column '{}': {} values could not be parsed and became null",
                series.name(),
                lost
            );
        }

        Ok(cleaned)
    }

    /// Extract the leading number of every cell of a duration-like column.
    pub fn extract_durations(&self, series: &Series) -> PolarsResult<Vec<Option<f64>>> {
        if is_numeric_dtype(series.dtype()) || matches!(series.dtype(), DataType::Null) {
            return numeric_values(series);
        }

        let text = series.cast(&DataType::String)?;
        Ok(text
            .str()?
            .into_iter()
            .map(|v| v.and_then(extract_leading_number))
            .collect())
    }
}
