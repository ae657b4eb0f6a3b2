//! Frequency encoding of high-cardinality columns.
//!
//! Two distributions are involved on purpose. Nulls are imputed by sampling
//! from the distribution of the batch being transformed, while the encoded
//! value is the frequency the category had in the fit data.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::{RESERVED_FREQUENCY, UnseenCategoryPolicy};
use crate::error::{PreprocessingError, Result};
use crate::imputers::CategoryDistribution;
use crate::utils::value_counts;

/// Fitted frequency map of one high-cardinality column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEncoder {
    pub frequencies: BTreeMap<String, f64>,
}

impl FrequencyEncoder {
    /// Relative frequency of every observed category. `None` when every value is null.
    pub fn fit(values: &[Option<String>]) -> Option<Self> {
        let counts = value_counts(values);
        let total: usize = counts.values().sum();
        if total == 0 {
            return None;
        }

        let frequencies = counts
            .into_iter()
            .map(|(category, count)| (category, count as f64 / total as f64))
            .collect();
        Some(Self { frequencies })
    }

    /// Fit-time frequency of a category, if it was observed.
    pub fn encode(&self, category: &str) -> Option<f64> {
        self.frequencies.get(category).copied()
    }

    /// Impute nulls from the batch distribution, then encode with fit-time frequencies.
    ///
    /// When the batch has no non-null value in this column the fit-time
    /// distribution is sampled instead.
    pub fn transform<R: Rng + ?Sized>(
        &self,
        column: &str,
        mut values: Vec<Option<String>>,
        policy: UnseenCategoryPolicy,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let distribution = CategoryDistribution::from_values(&values)
            .or_else(|| CategoryDistribution::from_frequencies(&self.frequencies))
            .ok_or_else(|| PreprocessingError::NoValidValues(column.to_string()))?;

        let filled = distribution.fill_nulls(&mut values, rng);
        if filled > 0 {
            debug!("Column '{}': sampled {} missing categories", column, filled);
        }

        let mut unseen = 0usize;
        let mut encoded = Vec::with_capacity(values.len());
        for value in values.into_iter().flatten() {
            match (self.encode(&value), policy) {
                (Some(frequency), _) => encoded.push(frequency),
                (None, UnseenCategoryPolicy::Reserved) => {
                    unseen += 1;
                    encoded.push(RESERVED_FREQUENCY);
                }
                (None, UnseenCategoryPolicy::Reject) => {
                    return Err(PreprocessingError::UnseenCategory {
                        column: column.to_string(),
                        value,
                    });
                }
            }
        }

        if unseen > 0 {
            warn!(
                "Column '{}': {} unseen categories encoded as frequency {}",
                column, unseen, RESERVED_FREQUENCY
            );
        }

        Ok(encoded)
    }
}
