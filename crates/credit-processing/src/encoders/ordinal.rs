//! Ordinal encoding of low-cardinality columns.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{RESERVED_ORDINAL_CODE, UnseenCategoryPolicy};
use crate::error::{PreprocessingError, Result};
use crate::imputers::StatisticalImputer;
use crate::utils::value_counts;

/// Fitted mode and vocabulary of one low-cardinality column.
///
/// Codes are positions in the sorted vocabulary, fixed at fit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    pub mode: String,
    pub categories: Vec<String>,
}

impl OrdinalEncoder {
    /// Fit on the raw column. `None` when every value is null.
    ///
    /// The vocabulary is taken after mode imputation, which adds nothing new
    /// since the mode is itself observed.
    pub fn fit(values: &[Option<String>]) -> Option<Self> {
        let mode = StatisticalImputer::fit_mode(values)?;
        let categories = value_counts(values).into_keys().collect();
        Some(Self { mode, categories })
    }

    /// Code of a category, if it was observed at fit time.
    pub fn code_of(&self, category: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
    }

    /// Impute nulls with the fitted mode and encode every cell.
    pub fn transform(
        &self,
        column: &str,
        mut values: Vec<Option<String>>,
        policy: UnseenCategoryPolicy,
    ) -> Result<Vec<f64>> {
        StatisticalImputer::fill_categorical(&mut values, &self.mode);

        let mut unseen = 0usize;
        let mut encoded = Vec::with_capacity(values.len());
        for value in values.into_iter().flatten() {
            match self.code_of(&value) {
                Some(code) => encoded.push(code as f64),
                None => match policy {
                    UnseenCategoryPolicy::Reserved => {
                        unseen += 1;
                        encoded.push(RESERVED_ORDINAL_CODE);
                    }
                    UnseenCategoryPolicy::Reject => {
                        return Err(PreprocessingError::UnseenCategory {
                            column: column.to_string(),
                            value,
                        });
                    }
                },
            }
        }

        if unseen > 0 {
            warn!(
                "Column '{}': {} unseen categories encoded as {}",
                column, unseen, RESERVED_ORDINAL_CODE
            );
        }

        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(list: &[Option<&str>]) -> Vec<Option<String>> {
        list.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_fit_sorted_vocabulary_and_mode() {
        let encoder =
            OrdinalEncoder::fit(&cats(&[Some("Standard"), Some("Good"), None, Some("Good")]))
                .unwrap();
        assert_eq!(encoder.mode, "Good");
        assert_eq!(encoder.categories, vec!["Good", "Standard"]);
        assert_eq!(encoder.code_of("Standard"), Some(1));
    }

    #[test]
    fn test_transform_imputes_mode() {
        let encoder = OrdinalEncoder::fit(&cats(&[Some("No"), Some("Yes"), Some("Yes")])).unwrap();
        let encoded = encoder
            .transform(
                "Payment_of_Min_Amount",
                cats(&[None, Some("No"), Some("Yes")]),
                UnseenCategoryPolicy::Reserved,
            )
            .unwrap();
        assert_eq!(encoded, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_identical_input_identical_codes() {
        let encoder = OrdinalEncoder::fit(&cats(&[Some("Bad"), Some("Good"), Some("Standard")]))
            .unwrap();
        let input = cats(&[Some("Standard"), Some("Bad"), Some("Good")]);
        let first = encoder
            .transform("Credit_Mix", input.clone(), UnseenCategoryPolicy::Reserved)
            .unwrap();
        let second = encoder
            .transform("Credit_Mix", input, UnseenCategoryPolicy::Reserved)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec![2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unseen_reserved_code() {
        let encoder = OrdinalEncoder::fit(&cats(&[Some("Bad"), Some("Good")])).unwrap();
        let encoded = encoder
            .transform(
                "Credit_Mix",
                cats(&[Some("_"), Some("Good")]),
                UnseenCategoryPolicy::Reserved,
            )
            .unwrap();
        assert_eq!(encoded, vec![RESERVED_ORDINAL_CODE, 1.0]);
    }

    #[test]
    fn test_unseen_rejected() {
        let encoder = OrdinalEncoder::fit(&cats(&[Some("Bad"), Some("Good")])).unwrap();
        let err = encoder
            .transform("Credit_Mix", cats(&[Some("_")]), UnseenCategoryPolicy::Reject)
            .unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::UnseenCategory { ref column, ref value }
                if column == "Credit_Mix" && value == "_"
        ));
    }

    #[test]
    fn test_all_null_column_cannot_fit() {
        assert!(OrdinalEncoder::fit(&cats(&[None, None])).is_none());
    }
}
