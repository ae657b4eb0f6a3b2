//! Min-max scaling with fitted parameters.

use serde::{Deserialize, Serialize};

use crate::utils::min_max;

/// Fitted min-max parameters of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    /// Fit on the non-null values. `None` when every value is null.
    pub fn fit(values: &[Option<f64>]) -> Option<Self> {
        min_max(values).map(|(min, max)| Self { min, max })
    }

    /// Whether the fitted range is degenerate.
    pub fn is_constant(&self) -> bool {
        self.max - self.min == 0.0
    }

    /// Scale one value. A zero-variance column maps every value to `0.0`.
    ///
    /// Values outside the fitted range land outside `[0, 1]`.
    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_constant() {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }
}
