//! Distribution-preserving imputation.
//!
//! Missing categories are replaced by draws from an empirical category
//! distribution. The random source is always supplied by the caller so a
//! seeded RNG gives reproducible output.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use std::collections::BTreeMap;

use crate::utils::value_counts;

/// Empirical distribution over categories, in category order.
#[derive(Debug, Clone)]
pub struct CategoryDistribution {
    categories: Vec<String>,
    index: WeightedIndex<f64>,
}

impl CategoryDistribution {
    /// Build from the non-null values of a column. `None` if there are none.
    pub fn from_values(values: &[Option<String>]) -> Option<Self> {
        let counts = value_counts(values);
        Self::from_weights(counts.into_iter().map(|(k, c)| (k, c as f64)))
    }

    /// Build from a fitted frequency map. `None` if the map is empty.
    pub fn from_frequencies(frequencies: &BTreeMap<String, f64>) -> Option<Self> {
        Self::from_weights(frequencies.iter().map(|(k, f)| (k.clone(), *f)))
    }

    fn from_weights(weights: impl Iterator<Item = (String, f64)>) -> Option<Self> {
        let (categories, weights): (Vec<String>, Vec<f64>) =
            weights.filter(|(_, w)| *w > 0.0).unzip();
        let index = WeightedIndex::new(&weights).ok()?;
        Some(Self { categories, index })
    }

    /// Categories this distribution can produce.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Draw one category.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.categories[self.index.sample(rng)]
    }

    /// Replace every null with a draw. Returns the number of filled cells.
    pub fn fill_nulls<R: Rng + ?Sized>(&self, values: &mut [Option<String>], rng: &mut R) -> usize {
        let mut filled = 0;
        for value in values.iter_mut().filter(|v| v.is_none()) {
            *value = Some(self.sample(rng).to_string());
            filled += 1;
        }
        filled
    }
}
