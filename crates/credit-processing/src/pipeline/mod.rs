//! Pipeline module.
//!
//! This module provides the column router that fits the preprocessing
//! pipeline and the fitted state that transforms batches.

pub mod outliers;
mod router;
pub mod scaler;
mod state;

pub use outliers::ClipBounds;
pub use router::PreprocessingPipeline;
pub use scaler::MinMaxScaler;
pub use state::{
    DurationColumn, FittedPipeline, FrequencyColumn, NumericColumn, OrdinalColumn, RemainderKind,
};
