//! Custom error types for the feature preprocessing pipeline.
//!
//! This module provides the error hierarchy using `thiserror` for context
//! throughout fitting and transforming.
//!
//! Errors are serializable so the HTTP layer can send them to clients as
//! `{ "code", "message" }` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Everything that can go wrong while fitting or applying the pipeline.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// A column the schema requires is absent from the batch.
    #[error("Required column '{0}' is missing from the batch")]
    ColumnNotFound(String),

    /// Rejected pipeline configuration or schema.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Nothing to learn a statistic from: every value is null after cleaning.
    #[error("Column '{0}' has no usable values to fit on")]
    NoValidValues(String),

    /// A column routed to the remainder could not be used as a numeric feature.
    #[error("Remainder column '{column}' has non-numeric type {dtype}")]
    NonNumericRemainder { column: String, dtype: String },

    /// A category that was not observed at fit time, under the `Reject` policy.
    #[error("Unseen category '{value}' in column '{column}'")]
    UnseenCategory { column: String, value: String },

    /// The produced feature matrix does not match the expected width.
    #[error("Feature width mismatch: expected {expected} columns, got {actual}")]
    FeatureWidthMismatch { expected: usize, actual: usize },

    /// Reading or writing a CSV or JSON file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame construction or access.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Fitted state or schema (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An inner error plus what the pipeline was doing at the time.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Wrap `self` with a note on the step that failed.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code; context wrappers report their source's code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::NonNumericRemainder { .. } => "NON_NUMERIC_REMAINDER",
            Self::UnseenCategory { .. } => "UNSEEN_CATEGORY",
            Self::FeatureWidthMismatch { .. } => "FEATURE_WIDTH_MISMATCH",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

/// Serialized as `{ "code", "message" }`.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Shorthand used across the crate.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}
