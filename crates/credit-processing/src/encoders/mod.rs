//! Categorical encoders.
//!
//! - [`OrdinalEncoder`]: low-cardinality columns, mode imputation then integer codes
//! - [`FrequencyEncoder`]: high-cardinality columns, sampled imputation then
//!   fit-time relative frequencies

mod frequency;
mod ordinal;

pub use frequency::FrequencyEncoder;
pub use ordinal::OrdinalEncoder;
