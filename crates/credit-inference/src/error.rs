//! Error types for the credit-inference crate.
//!
//! This module defines [`InferenceError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, InferenceError>`.
//!
//! # Error Handling
//!
//! Errors fall into two groups:
//! - **Client errors**: the request itself is unusable (no file, empty dataset,
//!   bad sample count). See [`InferenceError::is_client_error`].
//! - **Server errors**: preprocessing or model failures on an acceptable request.

use credit_processing::PreprocessingError;
use thiserror::Error;

/// The main error type for inference operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InferenceError {
    /// The request carried no usable upload.
    #[error("No input provided: {0}")]
    NoInput(String),

    /// The uploaded dataset has no rows.
    #[error("Empty dataset: the upload has no rows")]
    EmptyDataset,

    /// The requested sample count is not a positive integer.
    #[error("Invalid number of samples: {0}")]
    InvalidSampleCount(String),

    /// More rows were requested than the dataset holds.
    #[error("Requested sample count ({requested}) exceeds dataset size ({available})")]
    SampleSizeExceeded {
        /// Rows requested.
        requested: usize,
        /// Rows in the dataset.
        available: usize,
    },

    /// Preprocessing failed.
    #[error("Preprocessing failed: {0}")]
    Preprocessing(#[from] PreprocessingError),

    /// The model file is readable but not a usable classifier.
    ///
    /// Common causes:
    /// - weight rows of different lengths
    /// - intercept count differs from the class count
    /// - a voting ensemble whose members disagree on classes or width
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// The specified model file was not found.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The feature matrix does not have the width the classifier expects.
    #[error("Feature width mismatch: model expects {expected} features, got {actual}")]
    FeatureWidthMismatch {
        /// Width the model was trained on.
        expected: usize,
        /// Width of the matrix produced by preprocessing.
        actual: usize,
    },

    /// I/O error during model load.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while reading a model file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error while reading or sampling the upload.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Anything else, such as a panicked worker.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InferenceError {
    /// Whether the error is caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoInput(_)
                | Self::EmptyDataset
                | Self::InvalidSampleCount(_)
                | Self::SampleSizeExceeded { .. }
        )
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoInput(_) => "NO_INPUT",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InvalidSampleCount(_) => "INVALID_SAMPLE_COUNT",
            Self::SampleSizeExceeded { .. } => "SAMPLE_SIZE_EXCEEDED",
            Self::Preprocessing(inner) => inner.error_code(),
            Self::InvalidModel(_) => "INVALID_MODEL",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::FeatureWidthMismatch { .. } => "FEATURE_WIDTH_MISMATCH",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
