//! Configuration types for the preprocessing pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

use crate::schema::ColumnSchema;

/// How encoders treat a category that was not observed at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnseenCategoryPolicy {
    /// Encode with a reserved value: code `-1` for ordinal columns,
    /// frequency `0.0` for frequency-encoded columns.
    #[default]
    Reserved,
    /// Fail the transform.
    Reject,
}

/// Ordinal code assigned to an unseen category under [`UnseenCategoryPolicy::Reserved`].
pub const RESERVED_ORDINAL_CODE: f64 = -1.0;

/// Frequency assigned to an unseen category under [`UnseenCategoryPolicy::Reserved`].
pub const RESERVED_FREQUENCY: f64 = 0.0;

/// Configuration for the preprocessing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use credit_processing::config::{PipelineConfig, UnseenCategoryPolicy};
///
/// let config = PipelineConfig::builder()
///     .iqr_multiplier(1.5)
///     .unseen_category(UnseenCategoryPolicy::Reject)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Column membership.
    /// Default: the credit score schema
    pub schema: ColumnSchema,

    /// Character stripped from numeric-looking strings before parsing.
    /// Default: '_'
    pub separator: char,

    /// Numeric strings are truncated to this many characters before parsing.
    /// Default: 20
    pub max_numeric_len: usize,

    /// Multiplier of the IQR used for the clipping bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Handling of categories not observed at fit time.
    /// Default: Reserved
    pub unseen_category: UnseenCategoryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema: ColumnSchema::credit_score(),
            separator: '_',
            max_numeric_len: 20,
            iqr_multiplier: 1.5,
            unseen_category: UnseenCategoryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.max_numeric_len == 0 {
            return Err(ConfigValidationError::InvalidMaxNumericLen(
                self.max_numeric_len,
            ));
        }

        self.schema
            .validate()
            .map_err(|e| ConfigValidationError::InvalidSchema(e.to_string()))?;

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid maximum numeric length: {0} (must be at least 1)")]
    InvalidMaxNumericLen(usize),

    #[error("Invalid column schema: {0}")]
    InvalidSchema(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    schema: Option<ColumnSchema>,
    separator: Option<char>,
    max_numeric_len: Option<usize>,
    iqr_multiplier: Option<f64>,
    unseen_category: Option<UnseenCategoryPolicy>,
}

impl PipelineConfigBuilder {
    /// Set the column schema.
    pub fn schema(mut self, schema: ColumnSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the separator stripped from numeric strings.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Set the truncation length applied before numeric parsing.
    pub fn max_numeric_len(mut self, len: usize) -> Self {
        self.max_numeric_len = Some(len);
        self
    }

    /// Set the IQR multiplier for outlier clipping.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the unseen category policy.
    pub fn unseen_category(mut self, policy: UnseenCategoryPolicy) -> Self {
        self.unseen_category = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            schema: self.schema.unwrap_or_else(ColumnSchema::credit_score),
            separator: self.separator.unwrap_or('_'),
            max_numeric_len: self.max_numeric_len.unwrap_or(20),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(1.5),
            unseen_category: self.unseen_category.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.separator, '_');
        assert_eq!(config.max_numeric_len, 20);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.unseen_category, UnseenCategoryPolicy::Reserved);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .separator(',')
            .max_numeric_len(12)
            .iqr_multiplier(3.0)
            .unseen_category(UnseenCategoryPolicy::Reject)
            .build()
            .unwrap();

        assert_eq!(config.separator, ',');
        assert_eq!(config.max_numeric_len, 12);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.unseen_category, UnseenCategoryPolicy::Reject);
    }

    #[test]
    fn test_validation_invalid_multiplier() {
        let result = PipelineConfig::builder().iqr_multiplier(-1.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrMultiplier(_)
        ));

        let result = PipelineConfig::builder().iqr_multiplier(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_len() {
        let result = PipelineConfig::builder().max_numeric_len(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidMaxNumericLen(0)
        ));
    }

    #[test]
    fn test_validation_invalid_schema() {
        let mut schema = ColumnSchema::credit_score();
        schema.high_cardinality.push("Credit_Mix".to_string());
        let result = PipelineConfig::builder().schema(schema).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSchema(_)
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
