//! Statistical imputation methods.
//!
//! The fill value is always computed at fit time and passed in; these
//! functions never look at the batch being transformed.

use crate::utils::{median, string_mode};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Median of the non-null values, used as the numeric fill value.
    pub fn fit_median(values: &[Option<f64>]) -> Option<f64> {
        median(values)
    }

    /// Most frequent category, used as the categorical fill value.
    pub fn fit_mode(values: &[Option<String>]) -> Option<String> {
        string_mode(values)
    }

    /// Replace nulls with `fill`. Returns the number of filled cells.
    pub fn fill_numeric(values: &mut [Option<f64>], fill: f64) -> usize {
        let mut filled = 0;
        for value in values.iter_mut().filter(|v| v.is_none()) {
            *value = Some(fill);
            filled += 1;
        }
        filled
    }

    /// Replace nulls with `fill`. Returns the number of filled cells.
    pub fn fill_categorical(values: &mut [Option<String>], fill: &str) -> usize {
        let mut filled = 0;
        for value in values.iter_mut().filter(|v| v.is_none()) {
            *value = Some(fill.to_string());
            filled += 1;
        }
        filled
    }
}
