//! Feature preprocessing for the credit score classifier.
//!
//! A schema-driven, fit/transform pipeline built on Polars. Raw tabular
//! records are turned into the dense numeric matrix a trained classifier
//! expects.
//!
//! # Overview
//!
//! - **Column cleaning**: separator-polluted numbers (`"1_200"`) and
//!   duration text (`"22 Years and 1 Months"`) become `f64`
//! - **Numeric branch**: IQR clipping, median imputation, min-max scaling
//! - **Low-cardinality branch**: mode imputation, ordinal codes
//! - **High-cardinality branch**: distribution-sampling imputation, frequency encoding
//! - **Remainder**: unclassified numeric columns pass through
//!
//! Every statistic is learned by [`PreprocessingPipeline::fit`] and frozen in a
//! [`FittedPipeline`], which can be saved as JSON and shared across threads.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use credit_processing::{PipelineConfig, PreprocessingPipeline, io};
//! use rand::SeedableRng;
//!
//! let training = io::read_csv_path("train.csv")?;
//! let fitted = PreprocessingPipeline::new(PipelineConfig::default())?.fit(&training)?;
//! fitted.save("pipeline.json")?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let batch = fitted.transform(&training.head(Some(10)), &mut rng)?;
//! assert_eq!(batch.features.n_cols(), fitted.n_features());
//! ```
//!
//! # Randomness
//!
//! Only the high-cardinality imputer is random. It draws from the caller's
//! RNG; everything else is a pure function of the fitted state and the input.

pub mod cleaner;
pub mod config;
pub mod encoders;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::ColumnCleaner;
pub use config::{
    ConfigValidationError, PipelineConfig, PipelineConfigBuilder, RESERVED_FREQUENCY,
    RESERVED_ORDINAL_CODE, UnseenCategoryPolicy,
};
pub use encoders::{FrequencyEncoder, OrdinalEncoder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::{CategoryDistribution, StatisticalImputer};
pub use pipeline::{
    ClipBounds, FittedPipeline, MinMaxScaler, PreprocessingPipeline, RemainderKind,
};
pub use schema::{CREDIT_SCHEMA_VERSION, ColumnGroup, ColumnSchema, LabelSpec};
pub use types::{FeatureMatrix, PreprocessedBatch};
