//! Static column membership shared by the pipeline and any presentation layer.
//!
//! Column groups are configuration, never inferred from the data. The same
//! [`ColumnSchema`] value is used to fit the pipeline, to transform requests
//! and to describe the expected upload format to clients.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{PreprocessingError, Result};

/// Current version of the built-in credit score schema.
pub const CREDIT_SCHEMA_VERSION: u32 = 1;

/// The group a column is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    /// Dropped before any transform.
    Irrelevant,
    /// Cleaner, clipper, median imputer and min-max scaler.
    Numeric,
    /// Mode imputer and ordinal encoder.
    LowCardinality,
    /// Distribution-sampling imputer and frequency encoder.
    HighCardinality,
    /// The label column, separated from the features.
    Label,
    /// Not classified; passed through unchanged.
    Remainder,
}

/// The label column and its known classes.
///
/// A class is encoded as its index in `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub column: String,
    pub classes: Vec<String>,
}

impl LabelSpec {
    /// Code of a class name, if it is known.
    pub fn code_of(&self, value: &str) -> Option<u32> {
        self.classes
            .iter()
            .position(|class| class == value)
            .map(|idx| idx as u32)
    }

    /// Class name for a code, if it is in range.
    pub fn class_of(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// Versioned column membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub version: u32,
    #[serde(default)]
    pub irrelevant: Vec<String>,
    #[serde(default)]
    pub numeric: Vec<String>,
    #[serde(default)]
    pub low_cardinality: Vec<String>,
    #[serde(default)]
    pub high_cardinality: Vec<String>,
    /// Duration-like text columns whose leading number is extracted and scaled.
    /// A duration column may also be listed in `numeric`.
    #[serde(default)]
    pub duration: Vec<String>,
    #[serde(default)]
    pub label: Option<LabelSpec>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::credit_score()
    }
}

impl ColumnSchema {
    /// The schema of the credit score dataset the classifier was trained on.
    pub fn credit_score() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            version: CREDIT_SCHEMA_VERSION,
            irrelevant: names(&[
                "ID",
                "Customer_ID",
                "SSN",
                "Name",
                "Month",
                "Type_of_Loan",
                "Payment_Behaviour",
            ]),
            numeric: names(&[
                "Age",
                "Annual_Income",
                "Monthly_Inhand_Salary",
                "Num_Bank_Accounts",
                "Num_Credit_Card",
                "Interest_Rate",
                "Num_of_Loan",
                "Num_of_Delayed_Payment",
                "Changed_Credit_Limit",
                "Outstanding_Debt",
                "Credit_History_Age",
                "Credit_Utilization_Ratio",
                "Total_EMI_per_month",
                "Amount_invested_monthly",
                "Monthly_Balance",
                "Delay_from_due_date",
            ]),
            low_cardinality: names(&["Credit_Mix", "Payment_of_Min_Amount"]),
            high_cardinality: names(&["Occupation", "Num_Credit_Inquiries"]),
            duration: names(&["Credit_History_Age"]),
            label: Some(LabelSpec {
                column: "Credit_Score".to_string(),
                classes: names(&["Standard", "Poor", "Good"]),
            }),
        }
    }

    /// Load a schema from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let schema: ColumnSchema = serde_json::from_str(&content)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Group of a column. Columns not listed anywhere are [`ColumnGroup::Remainder`].
    ///
    /// Duration columns that are not also numeric report as `Remainder`; the
    /// router handles them through [`ColumnSchema::is_duration`].
    pub fn group_of(&self, column: &str) -> ColumnGroup {
        let contains = |list: &[String]| list.iter().any(|c| c == column);

        if self.label.as_ref().is_some_and(|l| l.column == column) {
            ColumnGroup::Label
        } else if contains(&self.irrelevant) {
            ColumnGroup::Irrelevant
        } else if contains(&self.numeric) {
            ColumnGroup::Numeric
        } else if contains(&self.low_cardinality) {
            ColumnGroup::LowCardinality
        } else if contains(&self.high_cardinality) {
            ColumnGroup::HighCardinality
        } else {
            ColumnGroup::Remainder
        }
    }

    /// Whether a column gets the leading-number extraction.
    pub fn is_duration(&self, column: &str) -> bool {
        self.duration.iter().any(|c| c == column)
    }

    /// Every column a batch must contain to be transformed.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.numeric
            .iter()
            .chain(&self.duration)
            .chain(&self.low_cardinality)
            .chain(&self.high_cardinality)
            .map(String::as_str)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Class names of the label, in code order.
    pub fn class_names(&self) -> Vec<String> {
        self.label
            .as_ref()
            .map(|l| l.classes.clone())
            .unwrap_or_default()
    }

    /// Check that the groups are disjoint and the label is usable.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        let groups = [
            &self.irrelevant,
            &self.numeric,
            &self.low_cardinality,
            &self.high_cardinality,
        ];
        for column in groups.into_iter().flatten() {
            if !seen.insert(column.as_str()) {
                return Err(PreprocessingError::InvalidConfig(format!(
                    "column '{}' is assigned to more than one group",
                    column
                )));
            }
        }

        for column in &self.duration {
            if matches!(
                self.group_of(column),
                ColumnGroup::Irrelevant | ColumnGroup::LowCardinality | ColumnGroup::HighCardinality
            ) {
                return Err(PreprocessingError::InvalidConfig(format!(
                    "duration column '{}' cannot also be irrelevant or categorical",
                    column
                )));
            }
        }

        if let Some(label) = &self.label {
            if seen.contains(label.column.as_str()) || self.is_duration(&label.column) {
                return Err(PreprocessingError::InvalidConfig(format!(
                    "label column '{}' is also assigned to a feature group",
                    label.column
                )));
            }
            if label.classes.len() < 2 {
                return Err(PreprocessingError::InvalidConfig(format!(
                    "label column '{}' needs at least two classes",
                    label.column
                )));
            }
            let unique: HashSet<&String> = label.classes.iter().collect();
            if unique.len() != label.classes.len() {
                return Err(PreprocessingError::InvalidConfig(format!(
                    "label column '{}' has duplicated classes",
                    label.column
                )));
            }
        }

        if self.required_columns().is_empty() {
            return Err(PreprocessingError::InvalidConfig(
                "schema routes no column to any feature branch".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_schema_is_valid() {
        let schema = ColumnSchema::credit_score();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.numeric.len(), 16);
        assert_eq!(schema.class_names(), vec!["Standard", "Poor", "Good"]);
    }

    #[test]
    fn test_group_of() {
        let schema = ColumnSchema::credit_score();
        assert_eq!(schema.group_of("SSN"), ColumnGroup::Irrelevant);
        assert_eq!(schema.group_of("Age"), ColumnGroup::Numeric);
        assert_eq!(schema.group_of("Credit_Mix"), ColumnGroup::LowCardinality);
        assert_eq!(schema.group_of("Occupation"), ColumnGroup::HighCardinality);
        assert_eq!(schema.group_of("Credit_Score"), ColumnGroup::Label);
        assert_eq!(schema.group_of("Something_Else"), ColumnGroup::Remainder);
        assert!(schema.is_duration("Credit_History_Age"));
    }

    #[test]
    fn test_label_codes() {
        let label = ColumnSchema::credit_score().label.unwrap();
        assert_eq!(label.code_of("Standard"), Some(0));
        assert_eq!(label.code_of("Poor"), Some(1));
        assert_eq!(label.code_of("Good"), Some(2));
        assert_eq!(label.code_of("Excellent"), None);
        assert_eq!(label.class_of(2), Some("Good"));
    }

    #[test]
    fn test_overlapping_groups_rejected() {
        let mut schema = ColumnSchema::credit_score();
        schema.low_cardinality.push("Age".to_string());
        let err = schema.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("Age"));
    }

    #[test]
    fn test_label_in_group_rejected() {
        let mut schema = ColumnSchema::credit_score();
        schema.numeric.push("Credit_Score".to_string());
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_required_columns_deduplicates_duration() {
        let schema = ColumnSchema::credit_score();
        let required = schema.required_columns();
        let history = required
            .iter()
            .filter(|c| **c == "Credit_History_Age")
            .count();
        assert_eq!(history, 1);
        assert_eq!(required.len(), 20);
    }

    #[test]
    fn test_schema_from_json() {
        let json = r#"{
            "version": 2,
            "numeric": ["a"],
            "low_cardinality": ["b"],
            "label": { "column": "y", "classes": ["no", "yes"] }
        }"#;
        let schema: ColumnSchema = serde_json::from_str(json).unwrap();
        assert!(schema.validate().is_ok());
        assert!(schema.irrelevant.is_empty());
        assert_eq!(schema.group_of("y"), ColumnGroup::Label);
    }
}
