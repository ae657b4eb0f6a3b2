//! Outlier handling module.
//!
//! Numeric columns are capped at IQR bounds (Q1 - k*IQR, Q3 + k*IQR). The
//! bounds are learned from the pre-clip distribution at fit time and reused
//! for every later transform.

use serde::{Deserialize, Serialize};

use crate::utils::{quantile_sorted, sorted_non_null};

/// Clipping interval of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ClipBounds {
    /// Compute the bounds from non-null values. `None` when every value is null.
    pub fn fit(values: &[Option<f64>], multiplier: f64) -> Option<Self> {
        let sorted = sorted_non_null(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;

        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Clip in place. Nulls are left alone. Returns how many values moved.
    pub fn clip(&self, values: &mut [Option<f64>]) -> usize {
        let mut clipped = 0;
        for value in values.iter_mut().flatten() {
            let bounded = value.clamp(self.lower, self.upper);
            if bounded != *value {
                clipped += 1;
                *value = bounded;
            }
        }
        clipped
    }
}
